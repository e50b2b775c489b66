// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Command implementations

pub mod export;
pub mod info;
pub mod load;
pub mod network;
pub mod rename;
pub mod validate;
pub mod view;
