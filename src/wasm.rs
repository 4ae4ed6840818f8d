//! WASM bindings for scene-glb.
//!
//! This module provides JavaScript-friendly APIs for use in the browser.

use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages in the browser console
    console_error_panic_hook::set_once();
}

/// Export configuration options.
#[wasm_bindgen]
pub struct ExportOptions {
    generator: Option<String>,
    strict: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl ExportOptions {
    #[wasm_bindgen(constructor)]
    pub fn new() -> ExportOptions {
        ExportOptions {
            generator: None,
            strict: false,
        }
    }

    #[wasm_bindgen(setter)]
    pub fn set_generator(&mut self, value: String) {
        self.generator = Some(value);
    }

    #[wasm_bindgen(setter)]
    pub fn set_strict(&mut self, value: bool) {
        self.strict = value;
    }
}

impl ExportOptions {
    fn to_config(&self) -> crate::ExportConfig {
        let mut config = crate::ExportConfig::default().with_strict(self.strict);
        if let Some(generator) = &self.generator {
            config = config.with_generator(generator.clone());
        }
        config
    }
}

/// Export result containing GLB data.
#[wasm_bindgen]
pub struct ExportResult {
    glb_data: Vec<u8>,
    node_count: usize,
}

#[wasm_bindgen]
impl ExportResult {
    /// Get the GLB binary data.
    #[wasm_bindgen(getter)]
    pub fn glb_data(&self) -> Vec<u8> {
        self.glb_data.clone()
    }

    /// Number of nodes written to the document.
    #[wasm_bindgen(getter)]
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// MIME type to use when offering the data as a download.
    #[wasm_bindgen(getter)]
    pub fn mime_type(&self) -> String {
        crate::GLB_MIME_TYPE.to_string()
    }

    /// Suggested download file name.
    #[wasm_bindgen(getter)]
    pub fn file_name(&self) -> String {
        crate::DEFAULT_FILE_NAME.to_string()
    }
}

/// Export a scene described as JSON to GLB.
///
/// See [`crate::Scene`] for the JSON format. A `null` scene is rejected.
#[wasm_bindgen]
pub fn export_scene_glb(json: &str, options: Option<ExportOptions>) -> Result<ExportResult, JsError> {
    let mut scene = crate::load_scene_from_bytes(json.as_bytes())
        .map_err(|e| JsError::new(&format!("Export failed: {}", e)))?;
    let node_count = scene
        .traverse()
        .filter(|node| node.is_exportable())
        .count();

    let config = options.unwrap_or_default().to_config();
    let glb_data = crate::export_glb(&mut scene, &config)
        .map_err(|e| JsError::new(&format!("Export failed: {}", e)))?;

    Ok(ExportResult {
        glb_data,
        node_count,
    })
}

/// Validate glTF JSON text, returning one message per issue.
#[wasm_bindgen]
pub fn validate_gltf(json: &str) -> js_sys::Array {
    crate::validate_slice(json.as_bytes())
        .iter()
        .map(|issue| JsValue::from_str(&issue.to_string()))
        .collect()
}
