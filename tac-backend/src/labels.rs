//! Jump target discovery
//! 
//! Branches may point forward or backward, so every target must be known
//! before the first instruction is lowered. This pass scans the whole
//! stream once and assigns each distinct numeric target one label.

use log::{debug, warn};
use std::collections::BTreeMap;
use tac_common::InstrIndex;
use tac_ir::IrInstruction;

/// Label name for an instruction index
pub fn label_name(index: InstrIndex) -> String {
    format!("LABEL_{}", index)
}

/// Per-invocation index to label table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelTable {
    labels: BTreeMap<InstrIndex, String>,
    stream_len: usize,
}

impl LabelTable {
    /// Scan `instructions` and register every numeric `JP`/`JPF` target
    pub fn discover(instructions: &[IrInstruction]) -> Self {
        let mut table = LabelTable {
            labels: BTreeMap::new(),
            stream_len: instructions.len(),
        };

        for (index, instr) in instructions.iter().enumerate() {
            if let Some(target) = instr.jump_address() {
                debug!("#{}: {} targets {}", index, instr.opcode, target);
                table.labels.entry(target).or_insert_with(|| label_name(target));
            }
        }

        for target in table.dangling() {
            warn!(
                "jump target {} is past the end of the stream ({} instructions)",
                target, table.stream_len
            );
        }
        table
    }

    /// Label to declare before instruction `index`, if it is a jump target
    pub fn label_at(&self, index: InstrIndex) -> Option<&str> {
        if index < self.stream_len {
            self.labels.get(&index).map(String::as_str)
        } else {
            None
        }
    }

    /// Label registered for `target`, whether or not it will be declared
    pub fn registered(&self, target: InstrIndex) -> Option<&str> {
        self.labels.get(&target).map(String::as_str)
    }

    /// Label for `target` only if it will be declared in the output
    pub fn resolve(&self, target: InstrIndex) -> Option<&str> {
        self.label_at(target)
    }

    /// Registered targets that lie outside the stream and so are never declared
    pub fn dangling(&self) -> Vec<InstrIndex> {
        self.labels
            .range(self.stream_len..)
            .map(|(index, _)| *index)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (InstrIndex, &str)> + '_ {
        self.labels.iter().map(|(index, name)| (*index, name.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tac_ir::parse_ir;

    #[test]
    fn test_forward_and_backward_targets() {
        let ir = parse_ir(
            "0\t(ASSIGN, #0, i, )\n\
             1\t(LT, i, #3, c)\n\
             2\t(JPF, c, 5, )\n\
             3\t(ADD, i, #1, i)\n\
             4\t(JP, 1, , )\n\
             5\t(PRINT, i, , )\n",
        );
        let labels = LabelTable::discover(&ir);

        assert_eq!(labels.len(), 2);
        assert_eq!(labels.label_at(1), Some("LABEL_1"));
        assert_eq!(labels.label_at(5), Some("LABEL_5"));
        assert_eq!(labels.label_at(0), None);
        assert!(labels.dangling().is_empty());
    }

    #[test]
    fn test_repeated_targets_share_one_label() {
        let ir = parse_ir("0\t(JP, 2, , )\n1\t(JPF, c, 2, )\n2\t(PRINT, #1, , )\n");
        let labels = LabelTable::discover(&ir);
        assert_eq!(labels.iter().collect::<Vec<_>>(), vec![(2, "LABEL_2")]);
    }

    #[test]
    fn test_only_numeric_slots_register() {
        // JP reads a1, JPF reads a2; symbolic and memory targets never register
        let ir = parse_ir(
            "0\t(JP, @ret, , )\n\
             1\t(JP, done, , )\n\
             2\t(JPF, 0, c, )\n\
             3\t(ADD, 1, 2, t)\n",
        );
        assert!(LabelTable::discover(&ir).is_empty());
    }

    #[test]
    fn test_targets_past_the_end_are_dangling() {
        let ir = parse_ir("0\t(JPF, c, 1, )\n1\t(JP, 7, , )\n");
        let labels = LabelTable::discover(&ir);
        assert_eq!(labels.resolve(1), Some("LABEL_1"));
        assert_eq!(labels.resolve(7), None);
        assert_eq!(labels.registered(7), Some("LABEL_7"));
        assert_eq!(labels.dangling(), vec![7]);
    }
}
