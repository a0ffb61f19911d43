//! Debug-server commands applied to a running sketch.

use std::sync::{Arc, Mutex, MutexGuard};

use arbor_debug::{DebugCommand, DebugHandler, DebugResponse, ResponseData, TreeStatsInfo};

use crate::core::{Color, Result};
use crate::procgen::ParamsEdit;
use crate::render::TextureId;

use super::Sketch;

/// Bridges panel commands onto a shared [`Sketch`].
pub struct SketchDebugHandler {
    sketch: Arc<Mutex<Sketch>>,
}

impl SketchDebugHandler {
    pub fn new(sketch: Arc<Mutex<Sketch>>) -> Self {
        Self { sketch }
    }

    fn sketch(&self) -> MutexGuard<'_, Sketch> {
        self.sketch.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn parse_color(value: Option<String>) -> Result<Option<Color>> {
    value.map(|s| s.parse()).transpose()
}

type ColorEdits = (Option<Color>, Option<Color>, Option<Color>);

fn parse_colors(root: Option<String>, branch: Option<String>, leaf: Option<String>) -> Result<ColorEdits> {
    Ok((parse_color(root)?, parse_color(branch)?, parse_color(leaf)?))
}

impl DebugHandler for SketchDebugHandler {
    fn handle_command(&mut self, cmd: DebugCommand) -> DebugResponse {
        match cmd {
            DebugCommand::Ping => DebugResponse::pong(),

            DebugCommand::GetTreeParams => match serde_json::to_value(self.sketch().params()) {
                Ok(params) => DebugResponse::ok(ResponseData::TreeParams { params }),
                Err(e) => DebugResponse::error(e.to_string()),
            },

            DebugCommand::SetTreeParams {
                root_color,
                branch_color,
                leaf_color,
                branch_count,
                branch_count_variance,
                branch_length,
                branch_length_variance,
                branch_angle,
                branch_angle_variance,
                branch_levels,
                branch_levels_variance,
                branch_min_angle,
                leaf_count,
                leaf_angle,
            } => {
                let (root_color, branch_color, leaf_color) = match parse_colors(root_color, branch_color, leaf_color) {
                    Ok(c) => c,
                    Err(e) => {
                        log::warn!("Rejected parameter update: {}", e);
                        return DebugResponse::error(e.to_string());
                    }
                };

                let edit = ParamsEdit {
                    root_color,
                    branch_color,
                    leaf_color,
                    branch_count,
                    branch_count_variance,
                    branch_length,
                    branch_length_variance,
                    branch_angle,
                    branch_angle_variance,
                    branch_levels,
                    branch_levels_variance,
                    branch_min_angle,
                    leaf_count,
                    leaf_angle,
                };
                let mut sketch = self.sketch();
                let changed = sketch.apply_edit(&edit);
                DebugResponse::ok(ResponseData::ParamsUpdated {
                    changed,
                    generation: sketch.lifecycle().generation(),
                })
            }

            DebugCommand::Regenerate { seed } => {
                let mut sketch = self.sketch();
                match seed {
                    Some(seed) => sketch.reseed(seed),
                    None => sketch.regenerate(),
                }
                DebugResponse::ok(ResponseData::ParamsUpdated {
                    changed: true,
                    generation: sketch.lifecycle().generation(),
                })
            }

            DebugCommand::GetTreeStats => {
                let stats = self.sketch().stats();
                let tree = &stats.tree;
                DebugResponse::ok(ResponseData::TreeStats(TreeStatsInfo {
                    generation: stats.generation,
                    trees: tree.trees as u32,
                    nodes: tree.nodes as u32,
                    branches: tree.branches as u32,
                    anchors: tree.anchors as u32,
                    leaves: tree.leaves as u32,
                    terminal_anchors: tree.terminal_anchors as u32,
                    max_level: tree.max_level,
                    live_geometry: stats.live_geometry as u32,
                    live_materials: stats.live_materials as u32,
                    bounds_min: tree.bounds.map(|b| b.min.to_array()),
                    bounds_max: tree.bounds.map(|b| b.max.to_array()),
                }))
            }

            DebugCommand::GetUniforms => uniforms_response(&self.sketch()),

            DebugCommand::BindShadowMap { texture } => {
                let mut sketch = self.sketch();
                sketch.uniforms_mut().bind_shadow_map(texture.map(TextureId));
                uniforms_response(&sketch)
            }
        }
    }
}

fn uniforms_response(sketch: &Sketch) -> DebugResponse {
    let uniforms = sketch.uniforms();
    DebugResponse::ok(ResponseData::Uniforms {
        time: uniforms.time(),
        shadow_map_bound: uniforms.shadow_map().is_some(),
        shadow_matrix: uniforms.shadow_matrix().to_cols_array(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sketch::SketchConfig;

    fn handler() -> (SketchDebugHandler, Arc<Mutex<Sketch>>) {
        let sketch = Arc::new(Mutex::new(Sketch::from_config(&SketchConfig::default())));
        (SketchDebugHandler::new(sketch.clone()), sketch)
    }

    fn set_branch_count(count: u32) -> DebugCommand {
        serde_json::from_value(serde_json::json!({
            "cmd": "SetTreeParams",
            "params": { "branch_count": count }
        }))
        .unwrap()
    }

    #[test]
    fn test_set_params_regenerates() {
        let (mut h, sketch) = handler();
        match h.handle_command(set_branch_count(2)) {
            DebugResponse::Ok {
                data: ResponseData::ParamsUpdated { changed, generation },
            } => {
                assert!(changed);
                assert_eq!(generation, 2);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(sketch.lock().unwrap().params().branch_count, 2);
    }

    #[test]
    fn test_set_min_angle_is_applied() {
        let (mut h, sketch) = handler();
        let cmd: DebugCommand = serde_json::from_value(serde_json::json!({
            "cmd": "SetTreeParams",
            "params": { "branch_min_angle": 0.75 }
        }))
        .unwrap();
        match h.handle_command(cmd) {
            DebugResponse::Ok {
                data: ResponseData::ParamsUpdated { changed, .. },
            } => assert!(changed),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(sketch.lock().unwrap().params().branch_min_angle, 0.75);
    }

    #[test]
    fn test_bad_color_rejected_without_regenerating() {
        let (mut h, sketch) = handler();
        let cmd: DebugCommand = serde_json::from_value(serde_json::json!({
            "cmd": "SetTreeParams",
            "params": { "leaf_color": "chartreuse", "branch_count": 1 }
        }))
        .unwrap();
        assert!(matches!(h.handle_command(cmd), DebugResponse::Error { .. }));
        let sketch = sketch.lock().unwrap();
        assert_eq!(sketch.lifecycle().generation(), 1);
        assert_ne!(sketch.params().branch_count, 1);
    }

    #[test]
    fn test_get_params_uses_panel_names() {
        let (mut h, _) = handler();
        match h.handle_command(DebugCommand::GetTreeParams) {
            DebugResponse::Ok {
                data: ResponseData::TreeParams { params },
            } => assert!(params.get("branchLength").is_some()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_stats_track_live_tree() {
        let (mut h, sketch) = handler();
        h.handle_command(DebugCommand::Regenerate { seed: Some(5) });
        match h.handle_command(DebugCommand::GetTreeStats) {
            DebugResponse::Ok {
                data: ResponseData::TreeStats(info),
            } => {
                let s = sketch.lock().unwrap();
                assert_eq!(info.generation, 2);
                assert_eq!(info.nodes as usize, s.lifecycle().current().unwrap().len());
                assert_eq!(info.live_geometry, info.nodes);
                assert!(info.bounds_min.is_some());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_uniforms_report_time() {
        let (mut h, sketch) = handler();
        sketch.lock().unwrap().tick(3.0);
        match h.handle_command(DebugCommand::GetUniforms) {
            DebugResponse::Ok {
                data: ResponseData::Uniforms { time, shadow_map_bound, .. },
            } => {
                assert_eq!(time, 3.0);
                assert!(!shadow_map_bound);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_bind_shadow_map() {
        let (mut h, sketch) = handler();
        match h.handle_command(DebugCommand::BindShadowMap { texture: Some(9) }) {
            DebugResponse::Ok {
                data: ResponseData::Uniforms { shadow_map_bound, .. },
            } => assert!(shadow_map_bound),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(sketch.lock().unwrap().uniforms().shadow_map(), Some(TextureId(9)));

        h.handle_command(DebugCommand::BindShadowMap { texture: None });
        assert_eq!(sketch.lock().unwrap().uniforms().shadow_map(), None);
    }
}
