//! Plain-text listings for presets and models

use std::fmt::Write;

use crate::api::community::CommunityPreset;
use crate::api::CurrentModel;
use crate::types::{ModelRecord, PresetRecord};

/// Left-aligned columns sized to their widest cell
fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let mut line = |cells: Vec<&str>| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect();
        let _ = writeln!(out, "{}", padded.join("  ").trim_end());
    };

    line(headers.to_vec());
    for row in rows {
        line(row.iter().map(String::as_str).collect());
    }
    out
}

pub fn presets_table(presets: &[PresetRecord]) -> String {
    if presets.is_empty() {
        return "No presets.\n".to_string();
    }
    let rows: Vec<Vec<String>> = presets
        .iter()
        .map(|p| {
            vec![
                p.id.to_string(),
                p.public_name().to_string(),
                p.fields.bot_name.clone(),
                p.model_id().to_string(),
                format!("{:.2}", p.fields.temperature),
            ]
        })
        .collect();
    table(&["ID", "NAME", "BOT", "MODEL", "TEMP"], &rows)
}

pub fn models_table(models: &[ModelRecord]) -> String {
    if models.is_empty() {
        return "No models.\n".to_string();
    }
    let rows: Vec<Vec<String>> = models
        .iter()
        .map(|m| {
            vec![
                m.id.to_string(),
                m.model_name.clone(),
                m.huggin_face_refference.clone(),
                m.size.clone().unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();
    table(&["ID", "NAME", "REFERENCE", "SIZE"], &rows)
}

pub fn community_table(presets: &[CommunityPreset]) -> String {
    if presets.is_empty() {
        return "The community catalog is empty.\n".to_string();
    }
    let rows: Vec<Vec<String>> = presets
        .iter()
        .map(|c| {
            vec![
                c.preset.id.to_string(),
                c.preset.public_name().to_string(),
                c.model_name.clone(),
            ]
        })
        .collect();
    table(&["ID", "NAME", "MODEL"], &rows)
}

pub fn preset_detail(preset: &PresetRecord) -> String {
    let p = &preset.fields;
    let mut out = String::new();
    let _ = writeln!(out, "Preset {}: {}", preset.id, p.public_name);
    let _ = writeln!(out, "  bot name:           {}", p.bot_name);
    let _ = writeln!(out, "  model id:           {}", p.model_id);
    let _ = writeln!(out, "  task:               {}", p.task);
    let _ = writeln!(out, "  constraints:        {}", p.costraints);
    let _ = writeln!(out, "  temperature:        {}", p.temperature);
    let _ = writeln!(out, "  repetition penalty: {}", p.repetition_penalty);
    let _ = writeln!(out, "  top p:              {}", p.top_p);
    let _ = writeln!(out, "  top k:              {}", p.top_k);
    out
}

pub fn model_detail(model: &ModelRecord) -> String {
    format!(
        "Model {}: {}\n  reference: {}\n  size:      {}\n",
        model.id,
        model.model_name,
        model.huggin_face_refference,
        model.size.as_deref().unwrap_or("unknown")
    )
}

pub fn current_model_line(current: Option<&CurrentModel>) -> String {
    match current {
        Some(model) => format!("Loaded: {} (id {})\n", model.model_name, model.id),
        None => "No model loaded.\n".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NewPreset;

    fn preset(id: i64, name: &str) -> PresetRecord {
        PresetRecord {
            id,
            fields: NewPreset::new(name, 2),
        }
    }

    #[test]
    fn test_columns_align() {
        let out = presets_table(&[preset(1, "A"), preset(12, "Longer name")]);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ID  NAME         BOT"));
        assert!(lines[2].starts_with("12  Longer name  bot  2      1.20"));
        let name_column = lines[0].find("NAME").unwrap();
        assert_eq!(lines[1].find('A'), Some(name_column));
    }

    #[test]
    fn test_empty_listings() {
        assert_eq!(presets_table(&[]), "No presets.\n");
        assert_eq!(models_table(&[]), "No models.\n");
    }

    #[test]
    fn test_model_without_size() {
        let model = ModelRecord {
            id: 3,
            model_name: "tiny".into(),
            huggin_face_refference: "org/tiny".into(),
            size: None,
        };
        let listing = models_table(std::slice::from_ref(&model));
        assert!(listing.lines().nth(1).unwrap().ends_with("org/tiny   -"));
        assert!(model_detail(&model).contains("unknown"));
    }

    #[test]
    fn test_current_model_line() {
        let current = CurrentModel {
            id: 5,
            model_name: "qwen".into(),
        };
        assert_eq!(current_model_line(Some(&current)), "Loaded: qwen (id 5)\n");
        assert_eq!(current_model_line(None), "No model loaded.\n");
    }
}
