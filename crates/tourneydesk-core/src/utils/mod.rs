//! Utility functions for string formatting and matching.

pub mod format;

pub use format::{
    cmp_ignore_case, contains_ignore_case, format_date, format_phone, phone_digits, truncate,
};
