//! Attribute lookup helpers.
//!
//! Probing an attribute that does not exist makes HDF5 print a diagnostic
//! stack, so every helper checks the attribute list first.

use netcdf::AttributeValue;

fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

fn attr_value(var: &netcdf::Variable, name: &str) -> Option<AttributeValue> {
    if !has_attr(var, name) {
        return None;
    }
    var.attribute_value(name)?.ok()
}

pub(crate) fn f32_attr(var: &netcdf::Variable, name: &str) -> Option<f32> {
    f32::try_from(attr_value(var, name)?).ok()
}

pub(crate) fn f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    f64::try_from(attr_value(var, name)?).ok()
}

pub(crate) fn i16_attr(var: &netcdf::Variable, name: &str) -> Option<i16> {
    i16::try_from(attr_value(var, name)?).ok()
}

pub(crate) fn string_attr(var: &netcdf::Variable, name: &str) -> Option<String> {
    match attr_value(var, name)? {
        AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}

pub(crate) fn global_string_attr(file: &netcdf::File, name: &str) -> Option<String> {
    if !file.attributes().any(|attr| attr.name() == name) {
        return None;
    }
    match file.attribute(name)?.value().ok()? {
        AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}
