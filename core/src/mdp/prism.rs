//! PRISM export
//!
//! Emits an `mdp` model with one `Plant` module holding interval-valued
//! probabilistic commands, followed by the attached controller block (if
//! any) verbatim. Output depends only on model content, never on insertion
//! order, so identical models give byte-identical files.

use super::model::IntervalMdp;
use crate::error::{AbstractionError, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Name of the physics module
pub const PLANT_MODULE: &str = "Plant";

/// Name of the state variable
pub const STATE_VAR: &str = "s";

impl IntervalMdp {
    /// Render the model in the PRISM language
    pub fn to_prism(&self) -> String {
        let stats = self.stats();
        let mut out = String::new();

        // Writing into a String cannot fail
        let _ = writeln!(out, "// Interval MDP abstraction of the longitudinal plant");
        let _ = writeln!(out, "// {}", stats);
        let _ = writeln!(out, "mdp");
        let _ = writeln!(out);
        let _ = writeln!(out, "module {}", PLANT_MODULE);
        let _ = writeln!(
            out,
            "    {} : [0..{}] init {};",
            STATE_VAR,
            self.num_states().saturating_sub(1),
            self.initial_state()
        );
        let _ = writeln!(out);

        for ((source, action), entries) in self.sorted() {
            let branches: Vec<String> = entries
                .iter()
                .map(|e| format!("{} : ({}'={})", e.interval, STATE_VAR, e.target))
                .collect();
            let _ = writeln!(
                out,
                "    [{}] {}={} -> {};",
                action,
                STATE_VAR,
                source,
                branches.join(" + ")
            );
        }

        let _ = writeln!(out, "endmodule");

        if let Some(escape) = self.escape_state() {
            let _ = writeln!(out);
            let _ = writeln!(out, "label \"escaped\" = {}={};", STATE_VAR, escape);
        }

        if let Some(logic) = self.controller_logic() {
            let _ = writeln!(out);
            out.push_str(logic);
            if !logic.ends_with('\n') {
                out.push('\n');
            }
        }

        out
    }

    /// Write the PRISM model to `path`
    pub fn write_prism<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_prism()).map_err(|source| AbstractionError::Serialization {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellId;

    fn two_state_model() -> IntervalMdp {
        let mut mdp = IntervalMdp::new(2);
        mdp.add_transition(CellId(0), "coast", CellId(1), 0.9, 1.0).unwrap();
        mdp
    }

    #[test]
    fn test_single_plant_module() {
        let text = two_state_model().to_prism();

        assert!(text.contains("mdp\n"));
        assert_eq!(text.matches("module Plant").count(), 1);
        assert_eq!(text.matches("endmodule").count(), 1);
        assert!(text.contains("s : [0..1] init 0;"));
        assert!(text.contains("[coast] s=0 -> [0.9,1] : (s'=1);"));
    }

    #[test]
    fn test_interval_not_collapsed() {
        let mut mdp = IntervalMdp::new(3);
        mdp.add_transition(CellId(0), "brake", CellId(2), 0.25, 0.75).unwrap();
        mdp.add_transition(CellId(0), "brake", CellId(1), 0.125, 0.5).unwrap();

        let text = mdp.to_prism();
        assert!(text.contains("[brake] s=0 -> [0.125,0.5] : (s'=1) + [0.25,0.75] : (s'=2);"));
    }

    #[test]
    fn test_controller_block_appended_verbatim() {
        let mut mdp = two_state_model();
        let block = "formula do_coast = (s=0);\n\n\
                     module Controller_safe\n    [coast] do_coast -> true;\nendmodule";
        mdp.attach_controller_logic(block.to_string());

        let text = mdp.to_prism();
        assert!(text.contains(block));
        assert!(text.find("module Plant").unwrap() < text.find("module Controller_safe").unwrap());
        assert!(text.ends_with("endmodule\n"));
    }

    #[test]
    fn test_escape_label() {
        let mut mdp = IntervalMdp::new(3);
        mdp.set_escape_state(CellId(2)).unwrap();
        assert!(mdp.to_prism().contains("label \"escaped\" = s=2;"));
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let path = std::env::temp_dir()
            .join("imdp_missing_dir_for_test")
            .join("nested")
            .join("model.prism");
        let err = two_state_model().write_prism(&path).unwrap_err();
        assert!(matches!(err, AbstractionError::Serialization { .. }));
    }
}
