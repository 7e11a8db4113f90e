//! `Math.*` constants

use tally_plugin::ConstantDef;

fn constant(name: &str, value: f64, description: &str) -> ConstantDef {
    ConstantDef {
        name: name.to_string(),
        value,
        description: description.to_string(),
    }
}

pub fn pi() -> ConstantDef {
    constant("PI", std::f64::consts::PI, "Ratio of a circle's circumference to its diameter")
}

pub fn e() -> ConstantDef {
    constant("E", std::f64::consts::E, "Euler's number")
}

pub fn ln2() -> ConstantDef {
    constant("LN2", std::f64::consts::LN_2, "Natural logarithm of 2")
}

pub fn ln10() -> ConstantDef {
    constant("LN10", std::f64::consts::LN_10, "Natural logarithm of 10")
}

pub fn sqrt2() -> ConstantDef {
    constant("SQRT2", std::f64::consts::SQRT_2, "Square root of 2")
}
