// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

//! End-to-end engine scenarios spanning the workspace crates.

mod specs {
    mod common;

    mod kill_path;
    mod priority_ordering;
    mod reaper;
    mod recurring;
    mod round_trip;
    mod scheduler_flow;
    mod stale_claim;
}
