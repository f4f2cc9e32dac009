//! Parallel walk of two snapshots, emitting breakage records per rule.
//!
//! Only entities public in the old snapshot are compared: public exit
//! points are what can break downstream users. Aliases are followed to
//! their final targets, but records carry the public exposure path.

use std::path::PathBuf;

use pyglass_model::{ModuleCollection, Object, ObjectKind, Parameter, ParameterKind, Parameters};
use tracing::debug;

use crate::breakage::{Breakage, BreakageDetails};

/// One fully loaded snapshot: a root module plus the collection that owns
/// it.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub root: &'a Object,
    pub collection: &'a ModuleCollection,
}

impl<'a> Snapshot<'a> {
    pub fn new(root: &'a Object, collection: &'a ModuleCollection) -> Self {
        Self { root, collection }
    }
}

/// Compares two snapshots and returns breakages in a deterministic
/// pre-order walk of the old snapshot.
pub fn check(old: Snapshot<'_>, new: Snapshot<'_>) -> Vec<Breakage> {
    let mut differ = Differ {
        old_collection: old.collection,
        new_collection: new.collection,
        breakages: Vec::new(),
    };
    differ.compare_members(old.root, new.root, &old.root.path);
    differ.breakages
}

struct Differ<'a> {
    old_collection: &'a ModuleCollection,
    new_collection: &'a ModuleCollection,
    breakages: Vec<Breakage>,
}

impl Differ<'_> {
    /// `exposure` is the public path prefix in the old snapshot; records
    /// carry exposure paths, never canonical ones.
    fn compare_members(&mut self, old: &Object, new: &Object, exposure: &str) {
        for (name, old_member) in &old.members {
            let member_exposure = format!("{exposure}.{name}");
            if name.starts_with('*') {
                continue;
            }
            if !old_member.is_public(self.old_collection) {
                continue;
            }
            let old_target = match old_member.delegate(self.old_collection) {
                Ok(target) => target,
                Err(error) => {
                    debug!(member = %old_member.path, %error, "skipping unresolvable alias");
                    continue;
                }
            };

            let Some(new_member) = new.get_member(name) else {
                self.breakages.push(Breakage::new(
                    member_exposure.clone(),
                    BreakageDetails::ObjectRemoved {},
                ));
                continue;
            };
            if !new_member.is_public(self.new_collection) {
                self.breakages.push(
                    Breakage::new(member_exposure.clone(), BreakageDetails::ObjectRemoved {})
                        .with_new_path(new_member.path.clone()),
                );
                continue;
            }
            let new_target = match new_member.delegate(self.new_collection) {
                Ok(target) => target,
                Err(error) => {
                    debug!(member = %new_member.path, %error, "skipping unresolvable alias");
                    continue;
                }
            };
            self.compare_single(&member_exposure, old_target, new_member, new_target);
        }
    }

    fn compare_single(
        &mut self,
        exposure: &str,
        old: &Object,
        new_exposure: &Object,
        new: &Object,
    ) {
        if old.kind() != new.kind() {
            let (filepath, lineno) = self.location(new);
            self.breakages.push(
                Breakage::new(
                    exposure.to_string(),
                    BreakageDetails::ObjectKindChanged {
                        old_kind: old.kind().to_string(),
                        new_kind: new.kind().to_string(),
                    },
                )
                .with_new_path(new_exposure.path.clone())
                .at(filepath, lineno),
            );
            return;
        }
        match (&old.kind, &new.kind) {
            (ObjectKind::Function(old_function), ObjectKind::Function(new_function)) => {
                self.compare_parameters(
                    exposure,
                    new,
                    &old_function.parameters,
                    &new_function.parameters,
                );
            }
            (ObjectKind::Class(_), ObjectKind::Class(_)) => {
                self.compare_bases(exposure, old, new);
                self.compare_members(old, new, exposure);
            }
            (ObjectKind::Module(_), ObjectKind::Module(_)) => {
                self.compare_members(old, new, exposure);
            }
            (ObjectKind::Attribute(old_attribute), ObjectKind::Attribute(new_attribute)) => {
                if let (Some(old_value), Some(new_value)) =
                    (&old_attribute.value, &new_attribute.value)
                {
                    let old_rendered = old_value.to_string();
                    let new_rendered = new_value.to_string();
                    if old_rendered != new_rendered {
                        let (filepath, lineno) = self.location(new);
                        self.breakages.push(
                            Breakage::new(
                                exposure.to_string(),
                                BreakageDetails::AttributeValueChanged {
                                    old_value: old_rendered,
                                    new_value: new_rendered,
                                },
                            )
                            .with_new_path(new_exposure.path.clone())
                            .at(filepath, lineno),
                        );
                    }
                }
            }
            _ => {}
        }
    }

    /// A resolved base present in old but absent from new's resolved
    /// bases breaks isinstance checks downstream.
    fn compare_bases(&mut self, exposure: &str, old: &Object, new: &Object) {
        let old_bases = old.resolved_bases(self.old_collection);
        let new_bases: Vec<String> = new
            .resolved_bases(self.new_collection)
            .iter()
            .map(|base| base.path.clone())
            .collect();
        for base in old_bases {
            if !new_bases.contains(&base.path) {
                let (filepath, lineno) = self.location(new);
                self.breakages.push(
                    Breakage::new(
                        exposure.to_string(),
                        BreakageDetails::ClassBaseRemoved {
                            base: base.path.clone(),
                        },
                    )
                    .at(filepath, lineno),
                );
            }
        }
    }

    fn compare_parameters(
        &mut self,
        exposure: &str,
        new_function: &Object,
        old_parameters: &Parameters,
        new_parameters: &Parameters,
    ) {
        let (filepath, lineno) = self.location(new_function);
        let push = |breakages: &mut Vec<Breakage>, details: BreakageDetails| {
            breakages.push(
                Breakage::new(exposure.to_string(), details)
                    .with_new_path(new_function.path.clone())
                    .at(filepath.clone(), lineno),
            );
        };

        for (old_index, old_parameter) in old_parameters.iter().enumerate() {
            match new_parameters.position(&old_parameter.name) {
                None => {
                    if !absorbed_by_variadics(old_parameter, new_parameters) {
                        push(
                            &mut self.breakages,
                            BreakageDetails::ParameterRemoved {
                                parameter: old_parameter.name.clone(),
                            },
                        );
                    }
                }
                Some(new_index) => {
                    let new_parameter = new_parameters
                        .get(&old_parameter.name)
                        .unwrap_or(old_parameter);
                    if new_parameter.kind != old_parameter.kind {
                        push(
                            &mut self.breakages,
                            BreakageDetails::ParameterKindChanged {
                                parameter: old_parameter.name.clone(),
                                old_kind: kind_name(old_parameter.kind).to_string(),
                                new_kind: kind_name(new_parameter.kind).to_string(),
                            },
                        );
                    } else if old_parameter.kind.is_positional() && new_index != old_index {
                        push(
                            &mut self.breakages,
                            BreakageDetails::ParameterMoved {
                                parameter: old_parameter.name.clone(),
                                old_index,
                                new_index,
                            },
                        );
                    }
                    match (&old_parameter.default, &new_parameter.default) {
                        (Some(_), None) => push(
                            &mut self.breakages,
                            BreakageDetails::ParameterNowRequired {
                                parameter: old_parameter.name.clone(),
                            },
                        ),
                        (Some(old_default), Some(new_default)) => {
                            let old_rendered = old_default.to_string();
                            let new_rendered = new_default.to_string();
                            if old_rendered != new_rendered {
                                push(
                                    &mut self.breakages,
                                    BreakageDetails::ParameterDefaultChanged {
                                        parameter: old_parameter.name.clone(),
                                        old_default: old_rendered,
                                        new_default: new_rendered,
                                    },
                                );
                            }
                        }
                        _ => {}
                    }
                }
            }
        }

        for new_parameter in new_parameters.iter() {
            if old_parameters.get(&new_parameter.name).is_none() && new_parameter.required() {
                push(
                    &mut self.breakages,
                    BreakageDetails::ParameterAddedRequired {
                        parameter: new_parameter.name.clone(),
                    },
                );
            }
        }
    }

    /// File and line of the new object: its own line, and the filepath of
    /// the closest enclosing module.
    fn location(&self, object: &Object) -> (Option<PathBuf>, Option<usize>) {
        let mut current = Some(object.path.clone());
        while let Some(path) = current {
            if let Some(found) = self.new_collection.get(&path) {
                if let ObjectKind::Module(module) = &found.kind {
                    return (module.filepath.clone(), object.lineno);
                }
            }
            current = path.rsplit_once('.').map(|(parent, _)| parent.to_string());
        }
        (None, object.lineno)
    }
}

/// A removed parameter does not break callers when a variadic of the
/// right kind absorbs the call site.
fn absorbed_by_variadics(old_parameter: &Parameter, new_parameters: &Parameters) -> bool {
    match old_parameter.kind {
        ParameterKind::PositionalOnly => new_parameters.has_variadic_positional(),
        ParameterKind::PositionalOrKeyword => {
            new_parameters.has_variadic_positional() && new_parameters.has_variadic_keyword()
        }
        ParameterKind::KeywordOnly => new_parameters.has_variadic_keyword(),
        ParameterKind::VariadicPositional => new_parameters.has_variadic_positional(),
        ParameterKind::VariadicKeyword => new_parameters.has_variadic_keyword(),
    }
}

fn kind_name(kind: ParameterKind) -> &'static str {
    match kind {
        ParameterKind::PositionalOnly => "positional-only",
        ParameterKind::PositionalOrKeyword => "positional-or-keyword",
        ParameterKind::VariadicPositional => "variadic-positional",
        ParameterKind::KeywordOnly => "keyword-only",
        ParameterKind::VariadicKeyword => "variadic-keyword",
    }
}
