use std::io::{self, IsTerminal, Read};

/// Targets from the command line, or from stdin when none were given and stdin is piped.
pub fn resolve_targets(args: Vec<String>) -> io::Result<Vec<String>> {
    if !args.is_empty() {
        return Ok(args);
    }
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(Vec::new());
    }
    read_targets(stdin.lock())
}

pub fn read_targets<R: Read>(reader: R) -> io::Result<Vec<String>> {
    let raw = io::read_to_string(reader)?;
    Ok(raw.split_whitespace().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_lines_and_spaces() {
        let input = "host-a host-b\n\thost-c\n\n  host-d  \n";
        assert_eq!(
            read_targets(input.as_bytes()).unwrap(),
            vec!["host-a", "host-b", "host-c", "host-d"]
        );
    }

    #[test]
    fn empty_input_has_no_targets() {
        assert!(read_targets(&b" \n"[..]).unwrap().is_empty());
    }

    #[test]
    fn arguments_take_precedence() {
        let args = vec!["x".to_string()];
        assert_eq!(resolve_targets(args.clone()).unwrap(), args);
    }
}
