//! Inspect command - print a frame document's tree

use anyhow::{Context, Result};
use colored::Colorize;
use framelink_runtime::{load_from_path, FrameArena, FrameId, Value};

/// Load a frame document and print every frame, descending into nested
/// frames with indentation.
pub fn inspect(frame_path: &str) -> Result<()> {
    let (arena, root) = load_from_path(frame_path)
        .with_context(|| format!("Failed to load frame document: {}", frame_path))?;

    // startup semantics: globals mirror the root frame's names
    let globals = arena.get(root).names.clone();
    println!("{}", format!("Frame tree from {}:", frame_path).cyan());
    print!("{}", render_tree(&arena, root, &globals, 0));
    Ok(())
}

fn render_tree(arena: &FrameArena, id: FrameId, globals: &[Value], depth: usize) -> String {
    let indent = "    ".repeat(depth);
    let frame = arena.get(id);

    let mut out = format!("{}frame {}:\n", indent, id);
    for line in frame.render(globals).lines() {
        out.push_str(&format!("{}  {}\n", indent, line));
    }
    for value in &frame.consts {
        if let Value::Frame(child) = value {
            out.push_str(&render_tree(arena, *child, globals, depth + 1));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use framelink_runtime::load_from_str;

    #[test]
    fn test_render_tree_descends_into_consts() {
        let (arena, root) = load_from_str(
            r#"{
                "co_code": "",
                "co_names": ["f"],
                "co_consts": [
                    {"co_code": "", "co_names": [], "co_varnames": ["y"],
                     "co_freevars": [], "co_cellvars": [], "co_consts": []}
                ]
            }"#,
        )
        .unwrap();

        // the child is allocated before its parent, so it takes id 0
        let rendered = render_tree(&arena, root, &[], 0);
        assert!(rendered.starts_with("frame #1:"));
        assert!(rendered.contains("    frame #0:"));
        assert!(rendered.contains("consts: [<frame #0>]"));
    }
}
