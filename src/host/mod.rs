//! Host-facing integration: a line-oriented JSON bridge for CMS processes
//! that cannot link the library directly.

pub mod stdio;
