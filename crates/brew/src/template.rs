//! Formula text rendering.
//!
//! Rendering is two separate passes over an explicit intermediate string:
//! a structural pass that lays out the formula grammar from a
//! [`FormulaContext`], and a substitution pass that hands the intermediate
//! text to the external [`Templater`]. A final sanitization pass trims
//! trailing horizontal whitespace per line so output is byte-stable no
//! matter which structural branches executed.

use crate::data::{FormulaContext, ReleasePackage};
use tapforge_artifact::{Arch, Os, Templater};
use tapforge_core::Result;

/// Derives the Ruby class identifier from a formula name.
///
/// The transformation order is load-bearing: hyphens to spaces, underscores
/// to spaces, periods deleted, `@` to the literal `AT`, words title-cased,
/// spaces removed.
#[must_use]
pub fn formula_class_name(name: &str) -> String {
    let spaced = name
        .replace('-', " ")
        .replace('_', " ")
        .replace('.', "")
        .replace('@', "AT");
    spaced
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect()
}

/// Trims trailing horizontal whitespace from every line.
///
/// Idempotent; the result always ends with a single newline.
#[must_use]
pub fn sanitize(text: &str) -> String {
    let mut out: String = text
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");
    out.push('\n');
    out
}

fn push(lines: &mut Vec<String>, indent: usize, text: &str) {
    if text.is_empty() {
        lines.push(String::new());
    } else {
        lines.push(format!("{}{}", " ".repeat(indent), text));
    }
}

fn push_block(lines: &mut Vec<String>, indent: usize, block: &[String]) {
    for line in block {
        push(lines, indent, line);
    }
}

/// The hardware guard a package stanza is wrapped in, if any.
fn cpu_guard(pkg: &ReleasePackage, intel_only_mac: bool) -> Option<&'static str> {
    match (pkg.os, pkg.arch) {
        (_, Arch::All) => None,
        (Os::Darwin, Arch::Amd64) if intel_only_mac => None,
        (_, Arch::Amd64 | Arch::I386) => Some("if Hardware::CPU.intel?"),
        (Os::Darwin, _) => Some("if Hardware::CPU.arm?"),
        (_, Arch::Arm64) => Some("if Hardware::CPU.arm? && Hardware::CPU.is_64_bit?"),
        (_, Arch::Arm) => Some("if Hardware::CPU.arm? && !Hardware::CPU.is_64_bit?"),
    }
}

fn push_package(lines: &mut Vec<String>, pkg: &ReleasePackage, intel_only_mac: bool) {
    let guard = cpu_guard(pkg, intel_only_mac);
    let indent = if guard.is_some() { 6 } else { 4 };
    if let Some(guard) = guard {
        push(lines, 4, guard);
    }

    let url = if pkg.download_strategy.is_empty() {
        format!("url \"{}\"", pkg.download_url)
    } else {
        format!("url \"{}\", using: {}", pkg.download_url, pkg.download_strategy)
    };
    push(lines, indent, &url);
    push(lines, indent, &format!("sha256 \"{}\"", pkg.sha256));

    if !pkg.install.is_empty() {
        lines.push(String::new());
        push(lines, indent, "def install");
        for line in &pkg.install {
            push(lines, indent + 2, line);
        }
        push(lines, indent, "end");
    }

    if guard.is_some() {
        push(lines, 4, "end");
    }
}

fn push_os_block(
    lines: &mut Vec<String>,
    keyword: &str,
    packages: &[ReleasePackage],
    intel_only_mac: bool,
) {
    if packages.is_empty() {
        return;
    }
    lines.push(String::new());
    push(lines, 2, &format!("{keyword} do"));
    for (i, pkg) in packages.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        push_package(lines, pkg, intel_only_mac);
    }
    push(lines, 2, "end");
}

/// Structural pass: lays out the formula grammar against the context.
///
/// Recipe-supplied placeholder expressions pass through untouched for the
/// substitution pass to resolve.
#[must_use]
pub fn render_structural(data: &FormulaContext) -> String {
    let mut lines: Vec<String> = vec![
        "# typed: false".to_string(),
        "# frozen_string_literal: true".to_string(),
        String::new(),
        "# This file was generated by tapforge. DO NOT EDIT.".to_string(),
    ];

    if !data.custom_require.is_empty() {
        push(&mut lines, 0, &format!("require_relative \"{}\"", data.custom_require));
    }

    push(
        &mut lines,
        0,
        &format!("class {} < Formula", formula_class_name(&data.name)),
    );
    if !data.desc.is_empty() {
        push(&mut lines, 2, &format!("desc \"{}\"", data.desc));
    }
    push(&mut lines, 2, &format!("homepage \"{}\"", data.homepage));
    push(&mut lines, 2, &format!("version \"{}\"", data.version));
    if !data.license.is_empty() {
        push(&mut lines, 2, &format!("license \"{}\"", data.license));
    }

    if !data.custom_block.is_empty() {
        lines.push(String::new());
        push_block(&mut lines, 2, &data.custom_block);
    }

    if !data.dependencies.is_empty() {
        lines.push(String::new());
        for dep in &data.dependencies {
            if dep.dep_type.is_empty() {
                push(&mut lines, 2, &format!("depends_on \"{}\"", dep.name));
            } else {
                push(
                    &mut lines,
                    2,
                    &format!("depends_on \"{}\" => :{}", dep.name, dep.dep_type),
                );
            }
        }
    }

    push_os_block(
        &mut lines,
        "on_macos",
        &data.macos_packages,
        data.has_only_amd64_macos_pkg,
    );
    push_os_block(&mut lines, "on_linux", &data.linux_packages, false);

    if !data.conflicts.is_empty() {
        lines.push(String::new());
        for conflict in &data.conflicts {
            push(&mut lines, 2, &format!("conflicts_with \"{conflict}\""));
        }
    }

    if !data.caveats.is_empty() {
        lines.push(String::new());
        push(&mut lines, 2, "def caveats");
        push(&mut lines, 4, "<<~EOS");
        push_block(&mut lines, 6, &data.caveats);
        push(&mut lines, 4, "EOS");
        push(&mut lines, 2, "end");
    }

    if !data.service.is_empty() {
        lines.push(String::new());
        push(&mut lines, 2, "service do");
        push_block(&mut lines, 4, &data.service);
        push(&mut lines, 2, "end");
    }

    if !data.post_install.is_empty() {
        lines.push(String::new());
        push(&mut lines, 2, "def post_install");
        push_block(&mut lines, 4, &data.post_install);
        push(&mut lines, 2, "end");
    }

    if !data.tests.is_empty() {
        lines.push(String::new());
        push(&mut lines, 2, "test do");
        push_block(&mut lines, 4, &data.tests);
        push(&mut lines, 2, "end");
    }

    push(&mut lines, 0, "end");
    lines.join("\n")
}

/// Renders the final formula text: structural pass, substitution pass,
/// sanitization.
///
/// # Errors
///
/// Propagates substitution failures verbatim.
pub fn render(data: &FormulaContext, templater: &dyn Templater) -> Result<String> {
    let structural = render_structural(data);
    let substituted = templater.apply(&structural)?;
    Ok(sanitize(&substituted))
}
