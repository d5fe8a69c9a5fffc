use serde::Deserialize;
use wasm_bindgen::prelude::*;

/// Options for emojifying, passed as a JavaScript object.
///
/// All fields are optional.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct EmojifyOptions {
    pub thresholds: Option<emojify_core::Thresholds>,
    pub scale_factor: Option<f64>,
    pub height_scaling: Option<emojify_core::HeightScaling>,
    pub format: Option<String>,
    pub quality: Option<f32>,
}

fn format_to_str(format: &emojify_core::OutputFormat) -> &'static str {
    match format {
        emojify_core::OutputFormat::Png => "png",
        emojify_core::OutputFormat::Jpeg => "jpeg",
        emojify_core::OutputFormat::Webp => "webp",
    }
}

fn string_to_format(format: &str) -> Result<emojify_core::OutputFormat, JsValue> {
    match format {
        "png" => Ok(emojify_core::OutputFormat::Png),
        "jpeg" => Ok(emojify_core::OutputFormat::Jpeg),
        "webp" => Ok(emojify_core::OutputFormat::Webp),
        _ => Err(make_error(
            "INVALID_OPTIONS",
            &format!("unknown format: {format}"),
        )),
    }
}

/// Create a JS `Error` with a `code` property.
fn make_error(code: &str, message: &str) -> JsValue {
    let err = js_sys::Error::new(message);
    let _ = js_sys::Reflect::set(&err, &"code".into(), &JsValue::from_str(code));
    JsValue::from(err)
}

/// Convert an `EmojifyError` into a JS `Error` with a machine-readable `code` property.
fn to_js_error(e: emojify_core::EmojifyError) -> JsValue {
    let code = match &e {
        emojify_core::EmojifyError::InvalidInput(_) => "INVALID_INPUT",
        emojify_core::EmojifyError::AssetError(_) => "ASSET_ERROR",
        emojify_core::EmojifyError::DecodeError(_) => "DECODE_ERROR",
        emojify_core::EmojifyError::EncodeError(_) => "ENCODE_ERROR",
        emojify_core::EmojifyError::InvalidQuality(_) => "INVALID_QUALITY",
    };
    make_error(code, &e.to_string())
}

fn parse_options(options: JsValue) -> Result<EmojifyOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        Ok(EmojifyOptions::default())
    } else {
        serde_wasm_bindgen::from_value(options)
            .map_err(|e| make_error("INVALID_OPTIONS", &format!("invalid options: {e}")))
    }
}

fn parse_faces(faces: JsValue) -> Result<Vec<emojify_core::FaceDescriptor>, JsValue> {
    serde_wasm_bindgen::from_value(faces)
        .map_err(|e| make_error("INVALID_INPUT", &format!("invalid faces: {e}")))
}

/// Decode an object mapping asset keys (`"smile"`, `"leftwink"`, ...) to
/// encoded image bytes.
fn parse_overlays(overlays: &js_sys::Object) -> Result<emojify_core::OverlaySet, JsValue> {
    let mut set = emojify_core::OverlaySet::new();
    for entry in js_sys::Object::entries(overlays).iter() {
        let pair = js_sys::Array::from(&entry);
        let key = pair
            .get(0)
            .as_string()
            .ok_or_else(|| make_error("INVALID_INPUT", "overlay keys must be strings"))?;
        let expression: emojify_core::Expression = key.parse().map_err(to_js_error)?;
        let bytes = js_sys::Uint8Array::new(&pair.get(1)).to_vec();
        set.insert_encoded(expression, &bytes).map_err(to_js_error)?;
    }
    Ok(set)
}

/// Apply parsed `EmojifyOptions` to an `Emojifier`.
fn apply_options(
    mut emojifier: emojify_core::Emojifier,
    opts: &EmojifyOptions,
) -> emojify_core::Emojifier {
    if let Some(thresholds) = opts.thresholds {
        emojifier = emojifier.thresholds(thresholds);
    }
    if let Some(scale) = opts.scale_factor {
        emojifier = emojifier.scale_factor(scale);
    }
    if let Some(scaling) = opts.height_scaling {
        emojifier = emojifier.height_scaling(scaling);
    }
    emojifier
}

/// Classify one face object (`{ x, y, width, height, leftEyeOpenProbability,
/// rightEyeOpenProbability, smilingProbability }`) into its asset key.
#[wasm_bindgen]
pub fn classify(face: JsValue, thresholds: JsValue) -> Result<String, JsValue> {
    let face: emojify_core::FaceDescriptor = serde_wasm_bindgen::from_value(face)
        .map_err(|e| make_error("INVALID_INPUT", &format!("invalid face: {e}")))?;
    let thresholds = if thresholds.is_undefined() || thresholds.is_null() {
        emojify_core::Thresholds::default()
    } else {
        serde_wasm_bindgen::from_value(thresholds)
            .map_err(|e| make_error("INVALID_OPTIONS", &format!("invalid thresholds: {e}")))?
    };
    thresholds.validate().map_err(to_js_error)?;

    let expression = emojify_core::Classifier::new(thresholds)
        .try_classify(&face)
        .map_err(to_js_error)?;
    Ok(expression.asset_key().to_string())
}

/// Draw one overlay per face onto a picture.
///
/// @param input - Raw image bytes (PNG, JPEG, or WebP)
/// @param faces - Array of face objects, composited in order
/// @param overlays - Object mapping asset keys to encoded overlay bytes
/// @param options - Optional object with fields: thresholds, scaleFactor,
///   heightScaling ("compounded" | "aspect-preserving"), format, quality
/// @returns `null` when `faces` is empty, otherwise
///   `{ data, format, width, height, expressions }`
#[wasm_bindgen]
pub fn emojify(
    input: Vec<u8>,
    faces: JsValue,
    overlays: js_sys::Object,
    options: JsValue,
) -> Result<JsValue, JsValue> {
    let opts = parse_options(options)?;
    let format = match opts.format.as_deref() {
        Some(f) => string_to_format(f)?,
        None => emojify_core::OutputFormat::default(),
    };

    let picture = emojify_core::decode_image(&input).map_err(to_js_error)?;
    let faces = parse_faces(faces)?;
    let overlays = parse_overlays(&overlays)?;

    let emojifier = apply_options(emojify_core::Emojifier::new(), &opts);
    let result = match emojifier.apply(&picture, &faces, &overlays).map_err(to_js_error)? {
        emojify_core::Emojified::Composited(result) => result,
        emojify_core::Emojified::NoFacesFound => return Ok(JsValue::NULL),
    };

    let data = emojify_core::encode_image(&result.image, &format, opts.quality.unwrap_or(0.9))
        .map_err(to_js_error)?;

    let obj = js_sys::Object::new();
    js_sys::Reflect::set(&obj, &"data".into(), &js_sys::Uint8Array::from(&data[..]))?;
    js_sys::Reflect::set(
        &obj,
        &"format".into(),
        &JsValue::from_str(format_to_str(&format)),
    )?;
    js_sys::Reflect::set(&obj, &"width".into(), &JsValue::from(result.image.width()))?;
    js_sys::Reflect::set(&obj, &"height".into(), &JsValue::from(result.image.height()))?;

    let expressions = js_sys::Array::new();
    for expression in &result.expressions {
        expressions.push(&JsValue::from_str(expression.asset_key()));
    }
    js_sys::Reflect::set(&obj, &"expressions".into(), &expressions)?;

    Ok(JsValue::from(obj))
}
