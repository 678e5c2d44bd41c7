//! Deserialization of stored objects by class name.

mod th1;

use crate::error::{Result, RootError};
use crate::histogram::Histogram;

/// Decode a histogram payload of class `class_name`.
pub fn read_histogram(payload: &[u8], class_name: &str) -> Result<Histogram> {
    match class_name {
        "TH1D" => th1::read_th1(payload, th1::Storage::Double),
        "TH1F" => th1::read_th1(payload, th1::Storage::Float),
        other => Err(RootError::UnsupportedClass(other.to_string())),
    }
}

/// Whether [`read_histogram`] understands `class_name`.
pub fn is_histogram_class(class_name: &str) -> bool {
    matches!(class_name, "TH1D" | "TH1F")
}
