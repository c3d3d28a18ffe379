//! Shared test harness modules for the NearBy CLI.

use super::*;

mod helpers;
