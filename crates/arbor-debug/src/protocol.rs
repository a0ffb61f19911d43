//! Debug protocol - JSON command/response definitions

use serde::{Deserialize, Serialize};

/// Commands sent by a remote panel to the debug server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", content = "params")]
pub enum DebugCommand {
    /// Ping (health check)
    Ping,
    /// Get the full current tree parameter set
    GetTreeParams,
    /// Set tree parameters (only specified fields are updated).
    /// Any change triggers a regeneration.
    SetTreeParams {
        #[serde(skip_serializing_if = "Option::is_none")]
        root_color: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        branch_color: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        leaf_color: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        branch_count: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        branch_count_variance: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        branch_length: Option<f32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        branch_length_variance: Option<f32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        branch_angle: Option<f32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        branch_angle_variance: Option<f32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        branch_levels: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        branch_levels_variance: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        branch_min_angle: Option<f32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        leaf_count: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        leaf_angle: Option<f32>,
    },
    /// Regenerate with the current parameters, optionally reseeding first
    Regenerate {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seed: Option<u64>,
    },
    /// Get counts and bounds of the live tree
    GetTreeStats,
    /// Get the per-frame monument uniforms
    GetUniforms,
    /// Bind (or with `None`, unbind) the shadow map texture of the monument
    BindShadowMap {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        texture: Option<u64>,
    },
}

/// Responses from debug server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum DebugResponse {
    #[serde(rename = "ok")]
    Ok { data: ResponseData },
    #[serde(rename = "error")]
    Error { message: String },
}

/// Response data variants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseData {
    None,
    Pong { message: String },
    /// Parameter set as the app serializes it
    TreeParams { params: serde_json::Value },
    ParamsUpdated { changed: bool, generation: u64 },
    TreeStats(TreeStatsInfo),
    Uniforms {
        time: f32,
        shadow_map_bound: bool,
        /// Column-major
        shadow_matrix: [f32; 16],
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeStatsInfo {
    pub generation: u64,
    pub trees: u32,
    pub nodes: u32,
    pub branches: u32,
    pub anchors: u32,
    pub leaves: u32,
    pub terminal_anchors: u32,
    pub max_level: u32,
    pub live_geometry: u32,
    pub live_materials: u32,
    pub bounds_min: Option<[f32; 3]>,
    pub bounds_max: Option<[f32; 3]>,
}

impl DebugResponse {
    pub fn ok(data: ResponseData) -> Self {
        Self::Ok { data }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self::Error {
            message: msg.into(),
        }
    }

    pub fn pong() -> Self {
        Self::ok(ResponseData::Pong {
            message: "pong".into(),
        })
    }

    pub fn none() -> Self {
        Self::ok(ResponseData::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unit_command() {
        let cmd: DebugCommand = serde_json::from_str(r#"{"cmd":"Ping"}"#).unwrap();
        assert!(matches!(cmd, DebugCommand::Ping));
    }

    #[test]
    fn test_parse_partial_params() {
        let cmd: DebugCommand =
            serde_json::from_str(r##"{"cmd":"SetTreeParams","params":{"branch_count":3,"leaf_color":"#ff0000"}}"##)
                .unwrap();
        match cmd {
            DebugCommand::SetTreeParams {
                branch_count,
                leaf_color,
                branch_length,
                ..
            } => {
                assert_eq!(branch_count, Some(3));
                assert_eq!(leaf_color.as_deref(), Some("#ff0000"));
                assert_eq!(branch_length, None);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_regenerate_seed_optional() {
        let cmd: DebugCommand = serde_json::from_str(r#"{"cmd":"Regenerate","params":{}}"#).unwrap();
        assert!(matches!(cmd, DebugCommand::Regenerate { seed: None }));
        let cmd: DebugCommand = serde_json::from_str(r#"{"cmd":"Regenerate","params":{"seed":7}}"#).unwrap();
        assert!(matches!(cmd, DebugCommand::Regenerate { seed: Some(7) }));
    }

    #[test]
    fn test_parse_min_angle_and_shadow_map() {
        let cmd: DebugCommand =
            serde_json::from_str(r#"{"cmd":"SetTreeParams","params":{"branch_min_angle":0.25}}"#).unwrap();
        assert!(matches!(
            cmd,
            DebugCommand::SetTreeParams { branch_min_angle: Some(a), .. } if a == 0.25
        ));

        let cmd: DebugCommand = serde_json::from_str(r#"{"cmd":"BindShadowMap","params":{"texture":4}}"#).unwrap();
        assert!(matches!(cmd, DebugCommand::BindShadowMap { texture: Some(4) }));
        let cmd: DebugCommand = serde_json::from_str(r#"{"cmd":"BindShadowMap","params":{}}"#).unwrap();
        assert!(matches!(cmd, DebugCommand::BindShadowMap { texture: None }));
    }

    #[test]
    fn test_response_shape() {
        let json = serde_json::to_value(DebugResponse::pong()).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["data"]["message"], "pong");

        let json = serde_json::to_value(DebugResponse::error("nope")).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "nope");
    }

    #[test]
    fn test_stats_serialize_flat() {
        let info = TreeStatsInfo {
            leaves: 12,
            ..Default::default()
        };
        let json = serde_json::to_value(DebugResponse::ok(ResponseData::TreeStats(info))).unwrap();
        assert_eq!(json["data"]["leaves"], 12);
    }
}
