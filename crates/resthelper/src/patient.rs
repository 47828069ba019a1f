//! Patient-specific attribute names.

use resthelper_core::Model;

/// A model the patient batch and prefix lookups can target.
///
/// The attribute names default to the usual patient schema; override the
/// constants when an application's patient entity names them differently.
pub trait PatientModel: Model {
    /// Surrogate key attribute used by the batch lookup.
    const ID_ATTRIBUTE: &'static str = "patientId";
    /// Soft-delete flag.
    const VOIDED_ATTRIBUTE: &'static str = "voided";
    /// Identifier attribute matched by the prefix lookup.
    const IDENTIFIER_ATTRIBUTE: &'static str = "identifier";
}
