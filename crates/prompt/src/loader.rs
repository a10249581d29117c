//! Prompt loader for workspace YAML overrides.

use crate::types::PromptDefinition;
use reel_core::{AppError, AppResult};
use std::path::{Path, PathBuf};

fn prompts_dir(workspace_path: &Path) -> PathBuf {
    workspace_path.join(".reel/prompts")
}

/// Load a prompt definition by ID from `.reel/prompts/<id>.yml`.
///
/// Returns `Ok(None)` when the workspace has no override for this ID.
///
/// # Example
/// ```no_run
/// use reel_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// if let Some(prompt) = load_prompt(Path::new("."), "system.standard")? {
///     println!("Loaded prompt: {}", prompt.title);
/// }
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<Option<PromptDefinition>> {
    let prompt_file = prompts_dir(workspace_path).join(format!("{}.yml", prompt_id));

    if !prompt_file.exists() {
        return Ok(None);
    }

    tracing::debug!("Loading prompt from: {:?}", prompt_file);

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to parse prompt YAML {:?}: {}",
            prompt_file, e
        ))
    })?;

    validate_prompt(&definition, prompt_id)?;

    tracing::info!("Loaded prompt: {} ({})", definition.id, definition.title);

    Ok(Some(definition))
}

/// List all prompt override IDs in the workspace.
pub fn list_prompts(workspace_path: &Path) -> AppResult<Vec<String>> {
    let dir = prompts_dir(workspace_path);

    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut prompt_ids = Vec::new();

    for entry in walkdir::WalkDir::new(&dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("yml") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                prompt_ids.push(stem.to_string());
            }
        }
    }

    prompt_ids.sort();
    Ok(prompt_ids)
}

fn validate_prompt(def: &PromptDefinition, expected_id: &str) -> AppResult<()> {
    if def.id != expected_id {
        return Err(AppError::Prompt(format!(
            "Prompt id '{}' does not match file name '{}'",
            def.id, expected_id
        )));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_prompt(workspace: &Path, id: &str, body: &str) {
        let dir = prompts_dir(workspace);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(format!("{}.yml", id)), body).unwrap();
    }

    #[test]
    fn test_missing_override_is_none() {
        let temp = TempDir::new().unwrap();
        assert!(load_prompt(temp.path(), "system.standard").unwrap().is_none());
        assert!(list_prompts(temp.path()).unwrap().is_empty());
    }

    #[test]
    fn test_load_valid_prompt() {
        let temp = TempDir::new().unwrap();
        write_prompt(
            temp.path(),
            "system.turbo",
            "id: system.turbo\ntitle: Short\napiVersion: \"1.0\"\ntemplate: Be brief about {{domain}}.\n",
        );

        let def = load_prompt(temp.path(), "system.turbo").unwrap().unwrap();
        assert_eq!(def.title, "Short");
        assert_eq!(list_prompts(temp.path()).unwrap(), vec!["system.turbo"]);
    }

    #[test]
    fn test_mismatched_id_rejected() {
        let temp = TempDir::new().unwrap();
        write_prompt(
            temp.path(),
            "system.turbo",
            "id: other\ntitle: Short\napiVersion: \"1.0\"\ntemplate: x\n",
        );
        assert!(load_prompt(temp.path(), "system.turbo").is_err());
    }

    #[test]
    fn test_bad_api_version_rejected() {
        let temp = TempDir::new().unwrap();
        write_prompt(
            temp.path(),
            "system.standard",
            "id: system.standard\ntitle: T\napiVersion: \"1\"\ntemplate: x\n",
        );
        assert!(load_prompt(temp.path(), "system.standard").is_err());
    }
}
