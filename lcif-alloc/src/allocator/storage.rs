/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Fallible reservation of per-call working storage.
//!
//! Every container the allocator needs is reserved through a
//! [`StorageBudget`] up front.  A refusal surfaces as
//! [`AllocError::StorageExhausted`] instead of aborting the process, and
//! since the containers are plain `Vec`s they are released on every exit
//! path.

use tracing::warn;

use super::error::AllocError;

/// Remaining cell allowance for one allocation call.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StorageBudget {
    remaining: Option<usize>,
}

impl StorageBudget {
    /// `None` means limited only by the global allocator.
    pub(crate) fn new(limit: Option<usize>) -> Self {
        Self { remaining: limit }
    }

    fn take(&mut self, what: &'static str, cells: usize) -> Result<(), AllocError> {
        let Some(remaining) = self.remaining else {
            return Ok(());
        };
        match remaining.checked_sub(cells) {
            Some(left) => {
                self.remaining = Some(left);
                Ok(())
            }
            None => {
                warn!(what, cells, remaining, "working storage limit reached");
                Err(AllocError::StorageExhausted { what, cells })
            }
        }
    }

    /// Reserve an empty `Vec` able to hold `cells` elements without
    /// reallocating.
    pub(crate) fn vec<T>(&mut self, what: &'static str, cells: usize) -> Result<Vec<T>, AllocError> {
        self.take(what, cells)?;
        let mut v = Vec::new();
        v.try_reserve_exact(cells).map_err(|e| {
            warn!(what, cells, error = %e, "working storage reservation refused");
            AllocError::StorageExhausted { what, cells }
        })?;
        Ok(v)
    }
}
