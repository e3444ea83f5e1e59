use std::path::{Path, PathBuf};

use clap::ValueEnum;

use crate::tokenizer::escape;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    #[default]
    Bash,
    Zsh,
}

fn current_exe() -> PathBuf {
    std::env::current_exe()
        .and_then(|exe| exe.canonicalize())
        .unwrap_or_else(|_| PathBuf::from("tabsmith"))
}

/// Shell code registering tabsmith as the completer for `commands`.
pub fn init_code(shell: Shell, commands: &[String]) -> anyhow::Result<String> {
    render_init_code(shell, &current_exe(), commands)
}

fn render_init_code(shell: Shell, exe: &Path, commands: &[String]) -> anyhow::Result<String> {
    if let Some(bad) = commands
        .iter()
        .find(|c| c.is_empty() || escape(c) != c.as_str())
    {
        anyhow::bail!("not a plain command name: {bad:?}");
    }

    let names = commands.join(" ");
    let mut out = String::new();
    out.push_str(&format!("# tabsmith completion for: {names}\n"));
    if shell == Shell::Zsh {
        out.push_str("autoload -U +X bashcompinit && bashcompinit\n");
    }
    out.push_str(&format!(
        r#"_tabsmith_complete() {{
    local IFS=$'\n'
    COMPREPLY=($({exe} complete --cursor "$COMP_CWORD" -- "${{COMP_WORDS[@]}}" 2>/dev/null))
}}
complete -o nospace -F _tabsmith_complete {names}
"#,
        exe = escape(&exe.to_string_lossy()),
    ));
    Ok(out)
}
