use log::info;
use std::error::Error;
use std::fs;

/// Standing instructions handed to the pipeline when no override file is
/// configured.
pub const DEFAULT_INSTRUCTIONS: &str = "## Role\n\
You are assisting users complete an intake form and have access to a knowledge\n\
base that contains project information.";

/// Loads the agent instructions, preferring the configured file over the
/// built-in default. An empty or whitespace-only file is rejected rather
/// than silently producing an agent with no role.
pub fn load_instructions(
    path: Option<&str>
) -> Result<String, Box<dyn Error + Send + Sync>> {
    match path {
        Some(p) => {
            let content = fs
                ::read_to_string(p)
                .map_err(|e| format!("Failed to read instructions file '{}': {}", p, e))?;
            if content.trim().is_empty() {
                return Err(format!("Instructions file '{}' is empty", p).into());
            }
            info!("Loaded agent instructions from: {}", p);
            Ok(content)
        }
        None => Ok(DEFAULT_INSTRUCTIONS.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_when_no_path_given() {
        let instructions = load_instructions(None).unwrap();
        assert!(instructions.contains("intake form"));
    }

    #[test]
    fn reads_override_file() {
        let dir = std::env::temp_dir();
        let path = dir.join("intake_agent_instructions_test.md");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "You are a different assistant.").unwrap();

        let instructions = load_instructions(path.to_str()).unwrap();
        assert!(instructions.contains("different assistant"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn rejects_missing_and_empty_files() {
        assert!(load_instructions(Some("/nonexistent/instructions.md")).is_err());

        let dir = std::env::temp_dir();
        let path = dir.join("intake_agent_empty_instructions_test.md");
        std::fs::write(&path, "   \n").unwrap();
        assert!(load_instructions(path.to_str()).is_err());
        std::fs::remove_file(&path).ok();
    }
}
