//! The unit table: 74 units across 22 kinds, plus their aliases

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::parse::normalize_token;
use crate::{Affine, UnitDefinition, UnitKind};

/// Global unit registry
pub static UNITS: LazyLock<UnitRegistry> = LazyLock::new(UnitRegistry::new);

/// Registry of all known units
///
/// Units keep their registration order. Alias keys are stored normalised, so
/// `"Square Feet"`, `"square-feet"` and `"square_feet"` share one entry.
pub struct UnitRegistry {
    units: Vec<UnitDefinition>,
    index: HashMap<&'static str, usize>,
    aliases: HashMap<String, usize>,
}

impl UnitRegistry {
    pub fn new() -> Self {
        let mut registry = UnitRegistry {
            units: Vec::new(),
            index: HashMap::new(),
            aliases: HashMap::new(),
        };
        registry.register_all_units();
        registry
    }

    /// Exact, case-sensitive lookup by id
    pub fn get(&self, id: &str) -> Option<&UnitDefinition> {
        self.index.get(id).map(|&i| &self.units[i])
    }

    /// Resolve a free-form token (name, plural, symbol, slug fragment)
    pub fn resolve(&self, token: &str) -> Option<&UnitDefinition> {
        let normalized = normalize_token(token);
        if normalized.is_empty() {
            return None;
        }
        if let Some(&i) = self.aliases.get(&normalized) {
            return Some(&self.units[i]);
        }
        let collapsed: String = normalized.split_whitespace().collect();
        self.aliases.get(&collapsed).map(|&i| &self.units[i])
    }

    /// All units of one kind, in registration order
    pub fn by_kind(&self, kind: UnitKind) -> Vec<&UnitDefinition> {
        self.units.iter().filter(|u| u.kind == kind).collect()
    }

    pub fn units(&self) -> &[UnitDefinition] {
        &self.units
    }

    /// The listed unit with an identity transform, if the kind has one
    pub fn base_unit(&self, kind: UnitKind) -> Option<&UnitDefinition> {
        self.units.iter().find(|u| u.kind == kind && u.is_base())
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Ids always claim their normalised key, even over an earlier alias.
    fn register(&mut self, unit: UnitDefinition) {
        let i = self.units.len();
        self.index.insert(unit.id, i);
        self.aliases.insert(normalize_token(unit.id), i);
        self.units.push(unit);
    }

    /// First registration of an alias wins.
    fn alias(&mut self, id: &str, names: &[&str]) {
        let Some(&i) = self.index.get(id) else {
            return;
        };
        for name in names {
            if !name.is_ascii() {
                continue;
            }
            let key = normalize_token(name);
            if key.is_empty() {
                continue;
            }
            self.aliases.entry(key).or_insert(i);
        }
    }

    fn register_all_units(&mut self) {
        self.register_length_units();
        self.register_weight_units();
        self.register_volume_units();
        self.register_temperature_units();
        self.register_area_units();
        self.register_illuminance_units();
        self.register_torque_units();
        self.register_energy_units();
        self.register_time_units();
        self.register_currency_units();
        self.register_frequency_units();
        self.register_density_units();
        self.register_force_units();
        self.register_voltage_units();
        self.register_resistance_units();
        self.register_angle_units();
        self.register_luminous_intensity_units();
        self.register_speed_units();
        self.register_pressure_units();
        self.register_power_units();
        self.register_data_size_units();
        self.register_data_rate_units();
    }

    fn register_length_units(&mut self) {
        use UnitKind::Length;
        self.register(UnitDefinition::new("meter", "Meter", "m", Length, Affine::IDENTITY, 4));
        self.register(UnitDefinition::new("kilometer", "Kilometer", "km", Length, Affine::scale(1000.0), 4));
        self.register(UnitDefinition::new("foot", "Foot", "ft", Length, Affine::scale(0.3048), 4));
        self.register(UnitDefinition::new("inch", "Inch", "in", Length, Affine::scale(0.0254), 4));
        self.register(UnitDefinition::new("centimeter", "Centimeter", "cm", Length, Affine::divide(100.0), 4));
        self.register(UnitDefinition::new("millimeter", "Millimeter", "mm", Length, Affine::divide(1000.0), 4));
        self.register(UnitDefinition::new("yard", "Yard", "yd", Length, Affine::scale(0.9144), 4));
        self.register(UnitDefinition::new("mile", "Mile", "mi", Length, Affine::scale(1609.344), 4));
        self.register(UnitDefinition::new("nautical_mile", "Nautical Mile", "nmi", Length, Affine::scale(1852.0), 4));

        self.alias("meter", &["meters", "metre", "metres", "m"]);
        self.alias("kilometer", &["kilometers", "kilometre", "kilometres", "km"]);
        self.alias("foot", &["feet", "ft"]);
        self.alias("inch", &["inches", "in"]);
        self.alias("centimeter", &["centimeters", "centimetre", "centimetres", "cm"]);
        self.alias("millimeter", &["millimeters", "millimetre", "millimetres", "mm"]);
        self.alias("yard", &["yards", "yd"]);
        self.alias("mile", &["miles", "mi"]);
        self.alias("nautical_mile", &["nautical_miles", "nautical miles", "nmi", "nm"]);
    }

    fn register_weight_units(&mut self) {
        use UnitKind::Weight;
        self.register(UnitDefinition::new("gram", "Gram", "g", Weight, Affine::divide(1000.0), 4));
        self.register(UnitDefinition::new("kilogram", "Kilogram", "kg", Weight, Affine::IDENTITY, 4));
        self.register(UnitDefinition::new("pound", "Pound", "lb", Weight, Affine::scale(0.45359237), 4));
        self.register(UnitDefinition::new("ounce", "Ounce", "oz", Weight, Affine::scale(0.0283495231), 4));
        self.register(UnitDefinition::new("stone", "Stone", "st", Weight, Affine::scale(6.35029318), 4));

        self.alias("gram", &["grams", "g"]);
        self.alias("kilogram", &["kilograms", "kilogramme", "kilogrammes", "kg"]);
        self.alias("pound", &["pounds", "lb", "lbs"]);
        self.alias("ounce", &["ounces", "oz"]);
        self.alias("stone", &["stones"]);
    }

    fn register_volume_units(&mut self) {
        use UnitKind::Volume;
        self.register(UnitDefinition::new("liter", "Liter", "L", Volume, Affine::IDENTITY, 4));
        self.register(UnitDefinition::new("milliliter", "Milliliter", "mL", Volume, Affine::divide(1000.0), 4));
        self.register(UnitDefinition::new("gallon", "US Gallon", "gal", Volume, Affine::scale(3.785411784), 4));
        self.register(UnitDefinition::new("gallon_uk", "UK Gallon (Imperial)", "gal_uk", Volume, Affine::scale(4.54609), 4));
        self.register(UnitDefinition::new("quart", "US Quart", "qt", Volume, Affine::scale(0.946352946), 4));
        self.register(UnitDefinition::new("cup", "US Cup", "cup", Volume, Affine::scale(3.785411784 / 16.0), 4));
        self.register(UnitDefinition::new("teaspoon", "Teaspoon", "tsp", Volume, Affine::scale(0.005), 4));

        self.alias("liter", &["liters", "litre", "litres", "l"]);
        self.alias("milliliter", &["milliliters", "millilitre", "millilitres", "ml"]);
        self.alias("gallon", &["gallons", "gal"]);
        self.alias("gallon_uk", &["gallon_imp", "imperial_gallon", "imperial gallon", "uk gallon"]);
        self.alias("quart", &["quarts", "qt"]);
        self.alias("cup", &["cups"]);
        self.alias("teaspoon", &["teaspoons", "tsp", "tsps", "tea spoon", "tea spoons"]);
    }

    fn register_temperature_units(&mut self) {
        use UnitKind::Temperature;
        self.register(UnitDefinition::new("celsius", "Celsius", "°C", Temperature, Affine::offset(273.15), 2));
        self.register(UnitDefinition::new(
            "fahrenheit",
            "Fahrenheit",
            "°F",
            Temperature,
            Affine::new(-32.0, 5.0, 9.0, 273.15),
            2,
        ));
        self.register(UnitDefinition::new("kelvin", "Kelvin", "K", Temperature, Affine::IDENTITY, 2));
        self.register(UnitDefinition::new("rankine", "Rankine", "°R", Temperature, Affine::divide(1.8), 2));

        self.alias("celsius", &["degrees celsius", "celcius", "degrees celcius"]);
        self.alias("fahrenheit", &["degrees fahrenheit"]);
        self.alias("kelvin", &["kelvins"]);
        self.alias("rankine", &["rankines", "degrees rankine"]);
    }

    fn register_area_units(&mut self) {
        use UnitKind::Area;
        self.register(UnitDefinition::new("square_meter", "Square Meter", "m²", Area, Affine::IDENTITY, 4));
        self.register(UnitDefinition::new("square_foot", "Square Foot", "ft²", Area, Affine::scale(0.09290304), 4));
        self.register(UnitDefinition::new("acre", "Acre", "ac", Area, Affine::scale(4046.8564224), 4));
        self.register(UnitDefinition::new("hectare", "Hectare", "ha", Area, Affine::scale(10000.0), 4));

        self.alias("square_meter", &["squaremeter", "squaremeters", "sqm", "square metre", "square meters", "square metres"]);
        self.alias("square_foot", &["squarefoot", "squarefeet", "square feet", "sqft"]);
        self.alias("acre", &["acres"]);
        self.alias("hectare", &["hectares", "ha"]);
    }

    fn register_illuminance_units(&mut self) {
        use UnitKind::Illuminance;
        self.register(UnitDefinition::new("lumen", "Lumen", "lm", Illuminance, Affine::IDENTITY, 2));
        self.register(UnitDefinition::new("lux", "Lux", "lx", Illuminance, Affine::IDENTITY, 2));

        self.alias("lumen", &["lumens", "lm"]);
        self.alias("lux", &["luxes", "lx"]);
    }

    fn register_torque_units(&mut self) {
        use UnitKind::Torque;
        self.register(UnitDefinition::new("newton_meter", "Newton-meter", "N·m", Torque, Affine::IDENTITY, 4));
        self.register(UnitDefinition::new("foot_pound", "Foot-pound", "ft·lbf", Torque, Affine::scale(1.355818), 4));

        self.alias("newton_meter", &["newton-meter", "newton meters", "n·m", "nm"]);
        self.alias("foot_pound", &["foot-pound", "foot pounds", "ft·lbf", "ftlbf", "ft-lbf", "ft-lb", "lb-ft"]);
    }

    fn register_energy_units(&mut self) {
        use UnitKind::Energy;
        self.register(UnitDefinition::new("kilocalorie", "Kilocalorie", "kcal", Energy, Affine::scale(4184.0), 2));
        self.register(UnitDefinition::new("kilojoule", "Kilojoule", "kJ", Energy, Affine::scale(1000.0), 2));
        self.register(UnitDefinition::new("joule", "Joule", "J", Energy, Affine::IDENTITY, 2));
        self.register(UnitDefinition::new("calorie", "Calorie", "cal", Energy, Affine::scale(4.184), 2));

        self.alias(
            "kilocalorie",
            &["kilocalories", "kcal", "kcals", "food calorie", "food calories", "large calorie"],
        );
        self.alias("kilojoule", &["kilojoules", "kJ", "kjs"]);
        self.alias("joule", &["joules", "J", "js"]);
        self.alias(
            "calorie",
            &["calories", "cal", "cals", "gram calorie", "gram calories", "small calorie", "small calories"],
        );
    }

    fn register_time_units(&mut self) {
        use UnitKind::Time;
        self.register(UnitDefinition::new("second", "Second", "s", Time, Affine::IDENTITY, 2));
        self.register(UnitDefinition::new("minute", "Minute", "min", Time, Affine::scale(60.0), 2));
        self.register(UnitDefinition::new("hour", "Hour", "h", Time, Affine::scale(3600.0), 4));
        self.register(UnitDefinition::new("day", "Day", "d", Time, Affine::scale(86400.0), 4));

        self.alias("second", &["seconds", "s", "sec", "secs"]);
        self.alias("minute", &["minutes", "min", "mins", "m"]);
        self.alias("hour", &["hours", "h", "hr", "hrs"]);
        self.alias("day", &["days", "d"]);
    }

    /// Static reference rates against USD; live rates come from the server's rate source.
    fn register_currency_units(&mut self) {
        use UnitKind::Currency;
        self.register(UnitDefinition::new("usd", "US Dollar", "$", Currency, Affine::IDENTITY, 2));
        self.register(UnitDefinition::new("eur", "Euro", "€", Currency, Affine::scale(1.10), 2));
        self.register(UnitDefinition::new("gbp", "British Pound", "£", Currency, Affine::scale(1.27), 2));

        self.alias("usd", &["US Dollar", "$", "dollar", "dollars"]);
        self.alias("eur", &["Euro", "euros", "€"]);
        self.alias("gbp", &["British Pound", "pound", "pounds", "£"]);
    }

    fn register_frequency_units(&mut self) {
        use UnitKind::Frequency;
        self.register(UnitDefinition::new("hertz", "Hertz", "Hz", Frequency, Affine::IDENTITY, 2));
        self.register(UnitDefinition::new("kilohertz", "Kilohertz", "kHz", Frequency, Affine::scale(1e3), 2));
        self.register(UnitDefinition::new("megahertz", "Megahertz", "MHz", Frequency, Affine::scale(1e6), 2));
        self.register(UnitDefinition::new("gigahertz", "Gigahertz", "GHz", Frequency, Affine::scale(1e9), 2));

        self.alias("hertz", &["Hz"]);
        self.alias("kilohertz", &["kHz", "kilo hertz"]);
        self.alias("megahertz", &["MHz", "mega hertz"]);
        self.alias("gigahertz", &["GHz", "giga hertz"]);
    }

    fn register_density_units(&mut self) {
        use UnitKind::Density;
        self.register(UnitDefinition::new(
            "kilogram_per_cubic_meter",
            "Kilogram per Cubic Meter",
            "kg/m³",
            Density,
            Affine::IDENTITY,
            4,
        ));
        self.register(UnitDefinition::new(
            "gram_per_cubic_centimeter",
            "Gram per Cubic Centimeter",
            "g/cm³",
            Density,
            Affine::scale(1000.0),
            4,
        ));
        self.register(UnitDefinition::new(
            "pounds_per_cubic_foot",
            "Pounds per Cubic Foot",
            "lb/ft³",
            Density,
            Affine::scale(16.01846),
            4,
        ));

        self.alias(
            "kilogram_per_cubic_meter",
            &["kg/m³", "kg/m3", "kilograms per cubic meter"],
        );
        self.alias(
            "gram_per_cubic_centimeter",
            &["g/cm³", "g/cm3", "grams per cubic centimeter"],
        );
        self.alias(
            "pounds_per_cubic_foot",
            &["lb/ft³", "lb/ft3", "pound per cubic foot", "lbs/ft³", "lbs/ft3"],
        );
    }

    fn register_force_units(&mut self) {
        use UnitKind::Force;
        self.register(UnitDefinition::new("newton", "Newton", "N", Force, Affine::IDENTITY, 3));
        self.register(UnitDefinition::new("kilonewton", "Kilonewton", "kN", Force, Affine::scale(1000.0), 3));
        self.register(UnitDefinition::new("pound_force", "Pound-Force", "lbf", Force, Affine::scale(4.44822), 3));

        self.alias("newton", &["newtons", "N"]);
        self.alias("kilonewton", &["kilonewtons", "kN"]);
        self.alias("pound_force", &["lbf", "pounds force"]);
    }

    fn register_voltage_units(&mut self) {
        use UnitKind::Voltage;
        self.register(UnitDefinition::new("volt", "Volt", "V", Voltage, Affine::IDENTITY, 4));
        self.register(UnitDefinition::new("millivolt", "Millivolt", "mV", Voltage, Affine::divide(1000.0), 4));
        self.register(UnitDefinition::new("kilovolt", "Kilovolt", "kV", Voltage, Affine::scale(1000.0), 4));

        self.alias("volt", &["volts", "V"]);
        self.alias("millivolt", &["millivolts", "mV"]);
        self.alias("kilovolt", &["kilovolts", "kV"]);
    }

    fn register_resistance_units(&mut self) {
        use UnitKind::Resistance;
        self.register(UnitDefinition::new("ohm", "Ohm", "Ω", Resistance, Affine::IDENTITY, 2));
        self.register(UnitDefinition::new("kilohm", "Kilohm", "kΩ", Resistance, Affine::scale(1000.0), 2));
        self.register(UnitDefinition::new("megohm", "Megohm", "MΩ", Resistance, Affine::scale(1e6), 2));

        self.alias("ohm", &["ohms", "Ω"]);
        self.alias("kilohm", &["kilohms", "kΩ"]);
        self.alias("megohm", &["megohms", "MΩ"]);
    }

    fn register_angle_units(&mut self) {
        use UnitKind::Angle;
        self.register(UnitDefinition::new(
            "degree",
            "Degree",
            "°",
            Angle,
            Affine::new(0.0, std::f64::consts::PI, 180.0, 0.0),
            4,
        ));
        self.register(UnitDefinition::new("radian", "Radian", "rad", Angle, Affine::IDENTITY, 4));

        self.alias("degree", &["degrees", "deg", "°"]);
        self.alias("radian", &["radians", "rad"]);
    }

    fn register_luminous_intensity_units(&mut self) {
        self.register(UnitDefinition::new(
            "candela",
            "Candela",
            "cd",
            UnitKind::LuminousIntensity,
            Affine::IDENTITY,
            2,
        ));
        self.alias("candela", &["candelas", "cd", "candle", "candles"]);
    }

    fn register_speed_units(&mut self) {
        use UnitKind::Speed;
        self.register(UnitDefinition::new(
            "kilometers_per_hour",
            "Kilometers per Hour",
            "km/h",
            Speed,
            Affine::IDENTITY,
            2,
        ));
        self.register(UnitDefinition::new(
            "miles_per_hour",
            "Miles per Hour",
            "mph",
            Speed,
            Affine::scale(1.609344),
            2,
        ));

        self.alias("kilometers_per_hour", &["km/h", "kmh", "km per hour"]);
        self.alias("miles_per_hour", &["mph", "mi/h"]);
    }

    fn register_pressure_units(&mut self) {
        use UnitKind::Pressure;
        self.register(UnitDefinition::new("bar", "Bar", "bar", Pressure, Affine::scale(100000.0), 4));
        self.register(UnitDefinition::new(
            "psi",
            "PSI (Pounds per Square Inch)",
            "psi",
            Pressure,
            Affine::scale(6894.757293),
            2,
        ));
        self.register(UnitDefinition::new("kilopascal", "Kilopascal", "kPa", Pressure, Affine::scale(1000.0), 2));

        self.alias("bar", &["bars"]);
        self.alias("psi", &["psig", "psia", "pounds per square inch", "pound per square inch"]);
        self.alias("kilopascal", &["kilopascals", "kPa", "kPas"]);
    }

    fn register_power_units(&mut self) {
        use UnitKind::Power;
        self.register(UnitDefinition::new("kilowatt", "Kilowatt", "kW", Power, Affine::scale(1000.0), 3));
        self.register(UnitDefinition::new("horsepower", "Horsepower", "hp", Power, Affine::scale(745.7), 3));

        self.alias("kilowatt", &["kilowatts", "kW"]);
        self.alias("horsepower", &["hp", "horse power"]);
    }

    fn register_data_size_units(&mut self) {
        use UnitKind::DataSize;
        self.register(UnitDefinition::new("megabyte", "Megabyte", "MB", DataSize, Affine::scale(1e6), 2));
        self.register(UnitDefinition::new("gigabyte", "Gigabyte", "GB", DataSize, Affine::scale(1e9), 2));

        self.alias("megabyte", &["megabytes", "MB"]);
        self.alias("gigabyte", &["gigabytes", "GB"]);
    }

    fn register_data_rate_units(&mut self) {
        use UnitKind::DataRate;
        self.register(UnitDefinition::new(
            "megabit_per_second",
            "Megabit per Second",
            "Mbps",
            DataRate,
            Affine::scale(125000.0),
            2,
        ));
        self.register(UnitDefinition::new(
            "megabyte_per_second",
            "Megabyte per Second",
            "MB/s",
            DataRate,
            Affine::scale(1e6),
            2,
        ));

        self.alias("megabit_per_second", &["Mbps"]);
        self.alias("megabyte_per_second", &["MB/s"]);
    }
}

impl Default for UnitRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_registry() {
        assert_eq!(UNITS.len(), 74);
        assert_eq!(UNITS.get("square_foot").map(|u| u.symbol), Some("ft²"));
        assert!(UNITS.get("Square_Foot").is_none());
    }

    #[test]
    fn test_every_kind_is_populated() {
        for kind in UnitKind::ALL {
            assert!(!UNITS.by_kind(kind).is_empty(), "{} has no units", kind);
        }
        assert_eq!(UNITS.base_unit(UnitKind::Energy).map(|u| u.id), Some("joule"));
        assert_eq!(UNITS.base_unit(UnitKind::Temperature).map(|u| u.id), Some("kelvin"));
        // watts are implied, never listed
        assert!(UNITS.base_unit(UnitKind::Power).is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        let mut ids: Vec<&str> = UNITS.units().iter().map(|u| u.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), UNITS.len());
    }

    #[test]
    fn test_alias_resolution() {
        for token in ["Square Feet", "sqft", "square_foot", "square-feet", "SquareFoot"] {
            assert_eq!(UNITS.resolve(token).map(|u| u.id), Some("square_foot"), "{}", token);
        }
        assert_eq!(UNITS.resolve("kg/m3").map(|u| u.id), Some("kilogram_per_cubic_meter"));
        assert_eq!(UNITS.resolve("MB/s").map(|u| u.id), Some("megabyte_per_second"));
        assert!(UNITS.resolve("furlong").is_none());
        assert!(UNITS.resolve("  ").is_none());
    }

    #[test]
    fn test_first_registration_wins() {
        assert_eq!(UNITS.resolve("m").map(|u| u.id), Some("meter"));
        assert_eq!(UNITS.resolve("nm").map(|u| u.id), Some("nautical_mile"));
        assert_eq!(UNITS.resolve("pounds").map(|u| u.id), Some("pound"));
        assert_eq!(UNITS.resolve("Calorie").map(|u| u.id), Some("calorie"));
        assert_eq!(UNITS.resolve("kcal").map(|u| u.id), Some("kilocalorie"));
    }

    #[test]
    fn test_by_kind_keeps_order() {
        let ids: Vec<&str> = UNITS.by_kind(UnitKind::Temperature).iter().map(|u| u.id).collect();
        assert_eq!(ids, ["celsius", "fahrenheit", "kelvin", "rankine"]);
    }
}
