use bytemuck::Pod;
use serde_json::{json, Value};

use crate::gltf::write_container;


/// Builds synthetic containers: typed arrays go into the binary chunk, the
/// caller supplies the rest of the metadata.
#[derive(Default)]
struct GlbBuilder {
    bin: Vec<u8>,
    buffer_views: Vec<Value>,
    accessors: Vec<Value>,
}

impl GlbBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Append raw bytes as a new buffer view, returning its index.
    fn push_view(&mut self, bytes: &[u8]) -> usize {
        while self.bin.len() % 4 != 0 {
            self.bin.push(0);
        }
        let offset = self.bin.len();
        self.bin.extend_from_slice(bytes);
        self.buffer_views.push(json!({
            "buffer": 0,
            "byteOffset": offset,
            "byteLength": bytes.len(),
        }));
        self.buffer_views.len() - 1
    }

    /// Append a typed array as a new accessor, returning its index.
    fn push_accessor<T: Pod>(&mut self, data: &[T], component_type: u32, ty: &str) -> usize {
        let view = self.push_view(bytemuck::cast_slice(data));
        self.accessors.push(json!({
            "bufferView": view,
            "componentType": component_type,
            "count": data.len(),
            "type": ty,
        }));
        self.accessors.len() - 1
    }

    /// Merge buffer views and accessors into `doc` and frame the container.
    fn build(self, mut doc: Value) -> Vec<u8> {
        doc["asset"] = json!({"version": "2.0"});
        doc["buffers"] = json!([{"byteLength": self.bin.len()}]);
        doc["bufferViews"] = Value::Array(self.buffer_views);
        doc["accessors"] = Value::Array(self.accessors);
        let json = serde_json::to_vec(&doc).unwrap();
        write_container(&json, &self.bin)
    }
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
