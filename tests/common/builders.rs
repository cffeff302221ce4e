//! Test data builders for creating scenes

use cle_assistant::scene::{ArgValue, OperationRecord, Scene, SceneNode};

/// Builder for scene snapshots with sequential node ids
pub struct SceneBuilder {
    scene: Scene,
    next_id: u32,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            next_id: 0,
        }
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add an image opened from `source`. Returns its id.
    pub fn read(&mut self, name: &str, source: &str, range: (f64, f64)) -> u32 {
        let id = self.next_id();
        self.scene.push(
            SceneNode::new(id, name)
                .with_source(source)
                .with_display_range(range.0, range.1),
        );
        id
    }

    /// Add the result of `operation` on `inputs`. Returns its id.
    pub fn apply(&mut self, name: &str, operation: &str, inputs: &[u32], literals: &[ArgValue]) -> u32 {
        let mut record = OperationRecord::new(operation);
        for input in inputs {
            record = record.input((*input).into());
        }
        for literal in literals {
            record = record.literal(literal.clone());
        }

        let id = self.next_id();
        self.scene.push(SceneNode::new(id, name).with_operation(record));
        id
    }

    /// Add a node built by the caller. Returns its id.
    pub fn node(&mut self, build: impl FnOnce(u32) -> SceneNode) -> u32 {
        let id = self.next_id();
        self.scene.push(build(id));
        id
    }

    pub fn build(self) -> Scene {
        self.scene
    }
}

impl Default for SceneBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// blobs -> gaussian blur (1, 1, 0) -> threshold otsu
pub fn three_node_scene() -> Scene {
    let mut b = SceneBuilder::new();
    let blobs = b.read("blobs", "data/blobs.tif", (8.0, 248.0));
    let blur = b.apply(
        "Result of gaussian blur",
        "gaussian_blur",
        &[blobs],
        &[ArgValue::Int(1), ArgValue::Int(1), ArgValue::Int(0)],
    );
    b.apply("Result of threshold otsu", "threshold_otsu", &[blur], &[]);
    b.build()
}

/// One source feeding two independent branches.
pub fn branching_scene() -> Scene {
    let mut b = SceneBuilder::new();
    let source = b.read("nuclei", "nuclei.tif", (0.0, 4095.0));
    let blur = b.apply(
        "Result of gaussian blur",
        "gaussian_blur",
        &[source],
        &[ArgValue::Float(2.0)],
    );
    b.apply("Result of threshold otsu", "threshold_otsu", &[blur], &[]);
    b.apply(
        "Result of top hat box",
        "top_hat_box",
        &[source],
        &[ArgValue::Int(5), ArgValue::Int(5), ArgValue::Int(0)],
    );
    b.build()
}
