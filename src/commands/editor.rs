//! Line-oriented edit sessions for model parameters, safety thresholds,
//! and program settings. Each session gathers a value object and applies
//! it atomically on accept; cancelling discards every change.

use crate::core::error::GchatError;
use crate::display;
use crate::session::{
    BlockThreshold, GenerationParams, HarmCategory, PresentationPrefs, SafetySettings,
};

fn prompt_u32(label: &str, current: u32, min: u32, max: u32) -> Result<u32, GchatError> {
    loop {
        let answer = display::prompt_line(&format!("{} [{}]: ", label, current))?;
        let answer = answer.trim();
        if answer.is_empty() {
            return Ok(current);
        }
        match answer.parse::<u32>() {
            Ok(value) if (min..=max).contains(&value) => return Ok(value),
            _ => println!("Enter a number between {} and {}.", min, max),
        }
    }
}

fn prompt_f64(label: &str, current: f64) -> Result<f64, GchatError> {
    loop {
        let answer = display::prompt_line(&format!("{} [{}]: ", label, current))?;
        let answer = answer.trim();
        if answer.is_empty() {
            return Ok(current);
        }
        match answer.parse::<f64>() {
            Ok(value) if (0.0..=1.0).contains(&value) => return Ok(value),
            _ => println!("Enter a number between 0 and 1."),
        }
    }
}

fn prompt_text(label: &str, current: &str) -> Result<String, GchatError> {
    let answer = display::prompt_line(&format!("{} [{}]: ", label, current))?;
    let answer = answer.trim();
    Ok(if answer.is_empty() {
        current.to_string()
    } else {
        answer.to_string()
    })
}

/// Normalizes an edited parameter set before it is applied. topK of 0 is
/// invalid input to the model and becomes 1; at most five stop sequences
/// are kept.
pub fn apply_params(mut params: GenerationParams) -> GenerationParams {
    if params.top_k == 0 {
        params.top_k = 1;
    }
    if params.candidate_count == 0 {
        params.candidate_count = 1;
    }
    params.stop_sequences.truncate(5);
    params.temperature = params.temperature.clamp(0.0, 1.0);
    params.top_p = params.top_p.clamp(0.0, 1.0);
    params
}

pub fn edit_params(current: &GenerationParams) -> Result<Option<GenerationParams>, GchatError> {
    println!("Model Parameters (blank keeps the current value)");
    let mut edit = current.clone();
    edit.candidate_count = prompt_u32("Number Response Candidates", edit.candidate_count, 1, 100)?;

    let stops = display::prompt_line(&format!(
        "Stop Sequences, comma separated, up to 5 [{}]: ",
        edit.stop_sequences.join(",")
    ))?;
    if !stops.trim().is_empty() {
        edit.stop_sequences = stops
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }

    edit.max_output_tokens = prompt_u32("Maximum Output Tokens", edit.max_output_tokens, 0, 4096)?;
    edit.temperature = prompt_f64("Temperature", edit.temperature)?;
    edit.top_p = prompt_f64("Top P", edit.top_p)?;
    edit.top_k = prompt_u32("Top K", edit.top_k, 0, 100)?;

    if display::confirm("Apply these parameters")? {
        Ok(Some(apply_params(edit)))
    } else {
        Ok(None)
    }
}

pub fn edit_safety(current: &SafetySettings) -> Result<Option<SafetySettings>, GchatError> {
    println!("Model Safety Settings");
    println!("Each category takes a threshold from 0 (block nothing) to 3 (block low and above).");
    let mut edit = current.clone();
    for category in HarmCategory::ALL {
        let level = prompt_u32(
            &format!("{} ({})", category.label(), edit.get(category).label()),
            edit.get(category).level() as u32,
            0,
            3,
        )?;
        // prompt_u32 bounds the level, so the conversion cannot fail.
        if let Some(threshold) = BlockThreshold::from_level(level as u8) {
            edit.set(category, threshold);
        }
    }

    if display::confirm("Apply these safety settings")? {
        Ok(Some(edit))
    } else {
        Ok(None)
    }
}

/// Program-settings edit session: the clear-first flag, the API key, and
/// the output colors. Returned as one value so the handler can apply it
/// atomically.
pub struct SettingsEdit {
    pub prefs: PresentationPrefs,
    pub api_key: Option<String>,
}

pub fn edit_settings(
    current: &PresentationPrefs,
    api_key: Option<&str>,
) -> Result<Option<SettingsEdit>, GchatError> {
    println!("Settings (blank keeps the current value)");
    let mut prefs = current.clone();

    let clear = display::prompt_line(&format!(
        "Clear results before each reply, y/n [{}]: ",
        if prefs.clear_first { "y" } else { "n" }
    ))?;
    match clear.trim().to_lowercase().as_str() {
        "y" => prefs.clear_first = true,
        "n" => prefs.clear_first = false,
        _ => {}
    }

    let key = display::prompt_line(&format!("API key [{}]: ", api_key.unwrap_or("")))?;
    let api_key = if key.trim().is_empty() {
        api_key.map(|k| k.to_string())
    } else {
        Some(key.trim().to_string())
    };

    prefs.user.color = prompt_text("User Color", &prefs.user.color)?;
    prefs.reply.color = prompt_text("Reply Color", &prefs.reply.color)?;
    prefs.help.color = prompt_text("Help Color", &prefs.help.color)?;
    prefs.help_accent = prompt_text("Help Color 2", &prefs.help_accent)?;
    prefs.debug.color = prompt_text("Debug Color", &prefs.debug.color)?;
    prefs.code.color = prompt_text("Code Color", &prefs.code.color)?;
    prefs.back_color = prompt_text("Background Color", &prefs.back_color)?;

    if display::confirm("Apply these settings")? {
        Ok(Some(SettingsEdit { prefs, api_key }))
    } else {
        Ok(None)
    }
}
