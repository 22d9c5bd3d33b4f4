//! Tree rendering of whole programs
//!
//! Each line carries the instruction's path: the indices of the enclosing
//! transfers followed by its own index, the same path validation errors
//! report.

use crate::error::Result;
use crate::formatter::format;
use xcmc_spec::encoding::to_hex;
use xcmc_spec::Program;

/// Render a program and all nested programs
pub fn render(program: &Program) -> Result<String> {
    let mut output = String::new();

    output.push_str("; XCM program\n");
    output.push_str(&format!("; Context:      {}\n", program.context()));
    output.push_str(&format!(
        "; Instructions: {} ({} total)\n",
        program.len(),
        program.len_recursive()
    ));
    output.push_str(&format!("; Depth:        {}\n", program.depth()));
    output.push_str(&format!("; Fingerprint:  {}\n", to_hex(&program.fingerprint()?)));
    output.push('\n');

    render_scope(program, &[], &mut output);
    Ok(output)
}

/// Render only the instruction lines
pub fn render_body(program: &Program) -> String {
    let mut output = String::new();
    render_scope(program, &[], &mut output);
    output
}

fn render_scope(program: &Program, path: &[usize], output: &mut String) {
    for (index, inst) in program.iter().enumerate() {
        let mut here = path.to_vec();
        here.push(index);
        let label: Vec<String> = here.iter().map(|i| i.to_string()).collect();

        output.push_str(&format!(
            "{:<8}{}{}\n",
            label.join("."),
            "  ".repeat(path.len()),
            format(inst, program.registry())
        ));

        if let Some(nested) = inst.nested() {
            render_scope(nested, &here, output);
        }
    }
}
