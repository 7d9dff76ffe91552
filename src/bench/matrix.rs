//! Pure transformation from the configured matrix to labelled type-check commands.

use crate::core::{BenchmarkCase, BenchmarkGroup, CommandDescriptor, MatrixGroup};

/// Build the command descriptor for one case: the compiler's type-check argv prefix
/// followed by the case inputs, verbatim and in order.
pub fn case_command(compiler: &[String], case: &BenchmarkCase) -> CommandDescriptor {
    let mut argv = Vec::with_capacity(compiler.len() + case.inputs.len());
    argv.extend(compiler.iter().cloned());
    argv.extend(case.inputs.iter().cloned());
    CommandDescriptor {
        label: case.name.clone(),
        argv,
    }
}

/// Build every group of the matrix, preserving group and case order.
///
/// Input files are not checked here; a missing file surfaces when the benchmarking tool runs.
pub fn build_matrix(matrix: &[MatrixGroup], compiler: &[String]) -> Vec<BenchmarkGroup> {
    matrix
        .iter()
        .map(|group| BenchmarkGroup {
            name: group.name.clone(),
            commands: group
                .cases
                .iter()
                .map(|case| case_command(compiler, case))
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(name: &str, inputs: &[&str]) -> BenchmarkCase {
        BenchmarkCase {
            name: name.to_string(),
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_single_group_two_cases() {
        let matrix = vec![MatrixGroup {
            name: "String".into(),
            cases: vec![case("A", &["a.swift"]), case("B", &["b.swift"])],
        }];
        let groups = build_matrix(&matrix, &["type-check".to_string()]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "String");
        assert_eq!(groups[0].labels(), vec!["A", "B"]);
        assert_eq!(groups[0].commands[0].argv, vec!["type-check", "a.swift"]);
        assert_eq!(groups[0].commands[1].argv, vec!["type-check", "b.swift"]);
    }

    #[test]
    fn test_inputs_follow_compiler_prefix_in_order() {
        let compiler: Vec<String> = ["xcrun", "-n", "swiftc", "-typecheck"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let cmd = case_command(&compiler, &case("Nested", &["Base.swift", "Nested.swift"]));
        assert_eq!(cmd.label, "Nested");
        assert_eq!(
            cmd.argv,
            vec!["xcrun", "-n", "swiftc", "-typecheck", "Base.swift", "Nested.swift"]
        );
    }

    #[test]
    fn test_no_validation_of_inputs() {
        let matrix = vec![MatrixGroup {
            name: "G".into(),
            cases: vec![case("Missing", &["/definitely/not/here.swift"])],
        }];
        let groups = build_matrix(&matrix, &["swiftc".to_string()]);
        assert_eq!(groups[0].commands[0].argv[1], "/definitely/not/here.swift");
    }
}
