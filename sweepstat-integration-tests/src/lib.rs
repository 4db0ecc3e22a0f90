//! End-to-end tests for the percentile merge engine live in `tests/`.
