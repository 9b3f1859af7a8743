//! Trigger DTOs

use serde::{Deserialize, Serialize};

use crate::domain::job::Parameters;
use crate::serde_ext::string_or_number;

/// Body of `POST /api/jenkins/trigger`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRequest {
    pub job_type: String,
    pub parameters: Parameters,
}

/// Payload of a successful trigger
///
/// The engine returns the queue item number; it is used as the build
/// number from then on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerAck {
    #[serde(deserialize_with = "string_or_number", alias = "build_number")]
    pub queue_number: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::envelope::Envelope;

    #[test]
    fn test_request_wire_format() {
        let req = TriggerRequest {
            job_type: "Platform".to_string(),
            parameters: Parameters::from([("source".to_string(), "clusterA".to_string())]),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["job_type"], "Platform");
        assert_eq!(value["parameters"]["source"], "clusterA");
    }

    #[test]
    fn test_ack_numeric_queue_number() {
        let env: Envelope<TriggerAck> =
            serde_json::from_str(r#"{"success": true, "data": {"queue_number": 42}}"#).unwrap();
        assert_eq!(env.data.unwrap().queue_number, "42");
    }
}
