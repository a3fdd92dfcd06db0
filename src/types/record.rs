//! Machine sensor record types

use serde::{Deserialize, Serialize};

// ============================================================================
// Machine Type
// ============================================================================

/// Product quality variant of the machine.
///
/// The service knows `L`, `M` and `H`. Any other code is carried verbatim so
/// the service can decide how to treat it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MachineType {
    Low,
    Medium,
    High,
    Other(String),
}

impl MachineType {
    /// Short code as sent on the wire.
    pub fn code(&self) -> &str {
        match self {
            MachineType::Low => "L",
            MachineType::Medium => "M",
            MachineType::High => "H",
            MachineType::Other(code) => code,
        }
    }

    /// Whether the code is one of the variants the service was trained on.
    pub fn is_known(&self) -> bool {
        !matches!(self, MachineType::Other(_))
    }
}

impl From<&str> for MachineType {
    fn from(code: &str) -> Self {
        match code {
            "L" => MachineType::Low,
            "M" => MachineType::Medium,
            "H" => MachineType::High,
            other => MachineType::Other(other.to_string()),
        }
    }
}

impl From<String> for MachineType {
    fn from(code: String) -> Self {
        match code.as_str() {
            "L" | "M" | "H" => MachineType::from(code.as_str()),
            _ => MachineType::Other(code),
        }
    }
}

impl From<MachineType> for String {
    fn from(machine_type: MachineType) -> Self {
        match machine_type {
            MachineType::Other(code) => code,
            known => known.code().to_string(),
        }
    }
}

impl std::fmt::Display for MachineType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

// ============================================================================
// Record
// ============================================================================

/// One row of machine operating parameters.
///
/// Serializes to the service's input schema. Numeric readings may be `NaN`
/// when the source field did not parse; the submission client refuses to send
/// those.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub product_id: String,
    #[serde(rename = "type")]
    pub machine_type: MachineType,
    /// Air temperature (K)
    pub air_temperature: f64,
    /// Process temperature (K)
    pub process_temperature: f64,
    /// Rotational speed (rpm)
    pub rotational_speed: f64,
    /// Torque (Nm)
    pub torque: f64,
    /// Tool wear (min)
    pub tool_wear: f64,
}

impl Record {
    /// Sensor readings paired with their wire field names, in schema order.
    pub fn readings(&self) -> [(&'static str, f64); 5] {
        [
            ("air_temperature", self.air_temperature),
            ("process_temperature", self.process_temperature),
            ("rotational_speed", self.rotational_speed),
            ("torque", self.torque),
            ("tool_wear", self.tool_wear),
        ]
    }

    /// Name of the first reading that has no JSON representation (`NaN` or
    /// infinite). Everything else, an empty product id included, is left for
    /// the service to judge.
    pub fn invalid_field(&self) -> Option<&'static str> {
        self.readings()
            .into_iter()
            .find(|(_, value)| !value.is_finite())
            .map(|(name, _)| name)
    }
}

// ============================================================================
// Single-Record Form
// ============================================================================

/// Operator-entered values for a single prediction.
///
/// Stricter than the stream parser: the product id must be present and the
/// type must be one the service knows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionForm {
    pub product_id: String,
    #[serde(rename = "type")]
    pub machine_type: String,
    pub air_temperature: f64,
    pub process_temperature: f64,
    pub rotational_speed: f64,
    pub torque: f64,
    pub tool_wear: f64,
}

impl PredictionForm {
    /// Validate the form into a [`Record`], or describe what is wrong.
    pub fn into_record(self) -> Result<Record, String> {
        let product_id = self.product_id.trim().to_string();
        if product_id.is_empty() {
            return Err("Please enter Product ID".to_string());
        }
        let machine_type = MachineType::from(self.machine_type.trim());
        if !machine_type.is_known() {
            return Err(format!(
                "Type must be one of L, M, H (got '{}')",
                machine_type.code()
            ));
        }

        let record = Record {
            product_id,
            machine_type,
            air_temperature: self.air_temperature,
            process_temperature: self.process_temperature,
            rotational_speed: self.rotational_speed,
            torque: self.torque,
            tool_wear: self.tool_wear,
        };
        match record.invalid_field() {
            Some(field) => Err(format!("{field} must be a finite number")),
            None => Ok(record),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> PredictionForm {
        PredictionForm {
            product_id: " L47230 ".to_string(),
            machine_type: "L".to_string(),
            air_temperature: 300.0,
            process_temperature: 310.0,
            rotational_speed: 1500.0,
            torque: 40.0,
            tool_wear: 150.0,
        }
    }

    #[test]
    fn form_validates_into_record() {
        let record = form().into_record().unwrap();
        assert_eq!(record.product_id, "L47230");
        assert_eq!(record.machine_type, MachineType::Low);
    }

    #[test]
    fn form_rejects_missing_product_id_and_unknown_type() {
        let mut missing = form();
        missing.product_id = "  ".to_string();
        assert_eq!(missing.into_record().unwrap_err(), "Please enter Product ID");

        let mut unknown = form();
        unknown.machine_type = "Z".to_string();
        assert!(unknown.into_record().unwrap_err().contains("L, M, H"));
    }

    fn sample() -> Record {
        Record {
            product_id: "M14860".to_string(),
            machine_type: MachineType::Medium,
            air_temperature: 298.1,
            process_temperature: 308.6,
            rotational_speed: 1551.0,
            torque: 42.8,
            tool_wear: 0.0,
        }
    }

    #[test]
    fn serializes_to_service_schema() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["product_id"], "M14860");
        assert_eq!(json["type"], "M");
        assert_eq!(json["rotational_speed"], 1551.0);
        assert_eq!(json["tool_wear"], 0.0);
    }

    #[test]
    fn unknown_machine_type_is_kept_verbatim() {
        let t = MachineType::from("X");
        assert!(!t.is_known());
        assert_eq!(String::from(t), "X");
        assert_eq!(MachineType::from("H".to_string()), MachineType::High);
    }

    #[test]
    fn valid_record_has_no_invalid_field() {
        assert_eq!(sample().invalid_field(), None);
    }

    #[test]
    fn reports_first_non_finite_reading() {
        let mut record = sample();
        record.torque = f64::NAN;
        record.tool_wear = f64::INFINITY;
        assert_eq!(record.invalid_field(), Some("torque"));
    }

    #[test]
    fn empty_product_id_is_left_to_the_service() {
        let mut record = sample();
        record.product_id.clear();
        assert_eq!(record.invalid_field(), None);
    }
}
