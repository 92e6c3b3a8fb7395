//! Core upload intake logic for Intake.
//!
//! This crate contains the filesystem side of the service with ZERO web
//! dependencies. The HTTP layer hands it a byte stream and a client-supplied
//! name; it hands back a stored file or a classified failure.
//!
//! # Modules
//!
//! - `storage` - Storage root provisioning, name validation and atomic writes

pub mod storage;
