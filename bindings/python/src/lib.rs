use std::collections::HashMap;

use emojify_core::{
    Classifier, Emojified, Emojifier, EmojifyError, Expression, FaceDescriptor, HeightScaling,
    OutputFormat, OverlaySet, Thresholds,
};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

fn to_py_err(e: EmojifyError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn format_to_string(format: &OutputFormat) -> &'static str {
    match format {
        OutputFormat::Png => "png",
        OutputFormat::Jpeg => "jpeg",
        OutputFormat::Webp => "webp",
    }
}

fn string_to_format(format: &str) -> PyResult<OutputFormat> {
    match format {
        "png" => Ok(OutputFormat::Png),
        "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
        "webp" => Ok(OutputFormat::Webp),
        _ => Err(PyValueError::new_err(format!("unknown format: {format}"))),
    }
}

fn string_to_height_scaling(mode: &str) -> PyResult<HeightScaling> {
    match mode {
        "compounded" => Ok(HeightScaling::Compounded),
        "aspect-preserving" => Ok(HeightScaling::AspectPreserving),
        _ => Err(PyValueError::new_err(format!("unknown height scaling: {mode}"))),
    }
}

/// Build a face from a dict with keys x, y, width, height,
/// left_eye_open_probability, right_eye_open_probability, smiling_probability.
fn face_from_dict(face: &HashMap<String, f64>) -> PyResult<FaceDescriptor> {
    let field = |key: &str| {
        face.get(key)
            .copied()
            .ok_or_else(|| PyValueError::new_err(format!("face is missing '{key}'")))
    };
    Ok(FaceDescriptor::new(field("x")?, field("y")?, field("width")?, field("height")?)
        .with_probabilities(
            field("left_eye_open_probability")? as f32,
            field("right_eye_open_probability")? as f32,
            field("smiling_probability")? as f32,
        ))
}

fn thresholds_from_args(
    left_eye_threshold: Option<f32>,
    right_eye_threshold: Option<f32>,
    smile_threshold: Option<f32>,
) -> Thresholds {
    let defaults = Thresholds::default();
    Thresholds {
        left_eye_open: left_eye_threshold.unwrap_or(defaults.left_eye_open),
        right_eye_open: right_eye_threshold.unwrap_or(defaults.right_eye_open),
        smiling: smile_threshold.unwrap_or(defaults.smiling),
    }
}

/// Classify one face into its overlay key ("smile", "leftwink", ...).
///
/// Args:
///     face: dict with x, y, width, height and the three probabilities
///     left_eye_threshold, right_eye_threshold, smile_threshold: optional overrides
#[pyfunction]
#[pyo3(signature = (face, *, left_eye_threshold=None, right_eye_threshold=None, smile_threshold=None))]
fn classify(
    face: HashMap<String, f64>,
    left_eye_threshold: Option<f32>,
    right_eye_threshold: Option<f32>,
    smile_threshold: Option<f32>,
) -> PyResult<&'static str> {
    let thresholds = thresholds_from_args(left_eye_threshold, right_eye_threshold, smile_threshold);
    thresholds.validate().map_err(to_py_err)?;
    let expression = Classifier::new(thresholds)
        .try_classify(&face_from_dict(&face)?)
        .map_err(to_py_err)?;
    Ok(expression.asset_key())
}

/// Draw one emoji overlay per face onto a picture.
///
/// Args:
///     input: Raw image bytes (PNG, JPEG, or WebP)
///     faces: list of face dicts, composited in order
///     overlays: dict mapping overlay keys ("smile", "frown", "closed_smile",
///         "closed_frown", "leftwink", "leftwinkfrown", "rightwink",
///         "rightwinkfrown") to encoded image bytes
///     format: "png", "jpeg" or "webp" (default: "png")
///     quality: JPEG quality 0.0–1.0 (default: 0.9)
///     scale_factor: overlay width relative to face width (default: 0.9)
///     height_scaling: "compounded" or "aspect-preserving"
///
/// Returns:
///     None when `faces` is empty, otherwise a dict with keys:
///     data (bytes), format (str), width (int), height (int), expressions (list[str])
#[pyfunction]
#[pyo3(signature = (input, faces, overlays, *, format=None, quality=None, scale_factor=None, height_scaling=None, left_eye_threshold=None, right_eye_threshold=None, smile_threshold=None))]
#[allow(clippy::too_many_arguments)]
fn emojify(
    py: Python<'_>,
    input: Vec<u8>,
    faces: Vec<HashMap<String, f64>>,
    overlays: HashMap<String, Vec<u8>>,
    format: Option<&str>,
    quality: Option<f32>,
    scale_factor: Option<f64>,
    height_scaling: Option<&str>,
    left_eye_threshold: Option<f32>,
    right_eye_threshold: Option<f32>,
    smile_threshold: Option<f32>,
) -> PyResult<Option<Py<PyDict>>> {
    let format = format.map(string_to_format).transpose()?.unwrap_or_default();
    let picture = emojify_core::decode_image(&input).map_err(to_py_err)?;
    let faces = faces
        .iter()
        .map(face_from_dict)
        .collect::<PyResult<Vec<_>>>()?;

    let mut assets = OverlaySet::new();
    for (key, bytes) in &overlays {
        let expression: Expression = key.parse().map_err(to_py_err)?;
        assets.insert_encoded(expression, bytes).map_err(to_py_err)?;
    }

    let mut emojifier = Emojifier::new().thresholds(thresholds_from_args(
        left_eye_threshold,
        right_eye_threshold,
        smile_threshold,
    ));
    if let Some(scale) = scale_factor {
        emojifier = emojifier.scale_factor(scale);
    }
    if let Some(mode) = height_scaling {
        emojifier = emojifier.height_scaling(string_to_height_scaling(mode)?);
    }

    let result = match emojifier.apply(&picture, &faces, &assets).map_err(to_py_err)? {
        Emojified::Composited(result) => result,
        Emojified::NoFacesFound => return Ok(None),
    };
    let data = emojify_core::encode_image(&result.image, &format, quality.unwrap_or(0.9))
        .map_err(to_py_err)?;

    let expressions: Vec<&str> = result.expressions.iter().map(|e| e.asset_key()).collect();
    let dict = PyDict::new(py);
    dict.set_item("data", pyo3::types::PyBytes::new(py, &data))?;
    dict.set_item("format", format_to_string(&format))?;
    dict.set_item("width", result.image.width())?;
    dict.set_item("height", result.image.height())?;
    dict.set_item("expressions", expressions)?;
    Ok(Some(dict.into()))
}

#[pymodule]
#[pyo3(name = "emojify")]
fn emojify_module(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(classify, m)?)?;
    m.add_function(wrap_pyfunction!(emojify, m)?)?;
    Ok(())
}
