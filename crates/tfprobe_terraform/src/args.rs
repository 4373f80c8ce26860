//! Argument construction for terraform subcommands.

use crate::options::Options;

/// Build `terraform init` arguments.
pub(crate) fn init(options: &Options) -> Vec<String> {
    let mut args = vec!["init".to_string(), "-input=false".to_string()];
    if options.no_color {
        args.push("-no-color".to_string());
    }
    for (key, value) in &options.backend_config {
        args.push(format!("-backend-config={}={}", key, value));
    }
    args
}

/// Build `terraform apply` arguments.
pub(crate) fn apply(options: &Options) -> Vec<String> {
    let mut args = vec![
        "apply".to_string(),
        "-input=false".to_string(),
        "-auto-approve".to_string(),
    ];
    push_common_flags(&mut args, options);
    args
}

/// Build `terraform destroy` arguments.
pub(crate) fn destroy(options: &Options) -> Vec<String> {
    let mut args = vec![
        "destroy".to_string(),
        "-input=false".to_string(),
        "-auto-approve".to_string(),
    ];
    push_common_flags(&mut args, options);
    args
}

/// Build `terraform plan` arguments. `-detailed-exitcode` distinguishes a
/// clean plan (0) from one with pending changes (2).
pub(crate) fn plan(options: &Options) -> Vec<String> {
    let mut args = vec![
        "plan".to_string(),
        "-input=false".to_string(),
        "-detailed-exitcode".to_string(),
    ];
    push_common_flags(&mut args, options);
    args
}

/// Build `terraform validate` arguments.
pub(crate) fn validate(options: &Options) -> Vec<String> {
    let mut args = vec!["validate".to_string()];
    if options.no_color {
        args.push("-no-color".to_string());
    }
    args
}

/// Build `terraform output` arguments.
pub(crate) fn output(name: Option<&str>) -> Vec<String> {
    let mut args = vec!["output".to_string(), "-json".to_string()];
    if let Some(name) = name {
        args.push(name.to_string());
    }
    args
}

fn push_common_flags(args: &mut Vec<String>, options: &Options) {
    if options.no_color {
        args.push("-no-color".to_string());
    }
    if !options.lock {
        args.push("-lock=false".to_string());
    }
    for target in &options.targets {
        args.push(format!("-target={}", target));
    }
    for (key, value) in &options.vars {
        args.push("-var".to_string());
        args.push(format!("{}={}", key, format_var_value(value)));
    }
    for var_file in &options.var_files {
        args.push(format!("-var-file={}", var_file.display()));
    }
}

/// Render a variable value the way terraform expects it on the command
/// line: strings bare, everything else as JSON (which terraform accepts
/// for numbers, bools, lists and maps).
fn format_var_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
