//! Test-only crate. Integration tests live in `tests/`.
