/*
Copyright (c) 2024 the p4rt contributors
SPDX-License-Identifier: MIT
Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:
The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.
THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

//! The program description document and the index over it.
//!
//! A [`ProgramDescription`] is the parsed JSON rendering of a P4Info
//! document (camelCase keys, enum values spelled the way the descriptor
//! names them). It is immutable once loaded; a [`ProgramIndex`] takes
//! exclusive ownership and answers name/alias/id resolution queries for
//! every entity kind.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgramDescription {
    pub tables: Vec<TableDesc>,
    pub actions: Vec<ActionDesc>,
    pub direct_counters: Vec<CounterDesc>,
}

impl ProgramDescription {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, Error> {
        Ok(serde_json::from_value(value)?)
    }
}

/// Common identification shared by every top-level entity.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preamble {
    pub id: u32,
    pub name: String,
    pub alias: Option<String>,
}

impl Preamble {
    /// Case-sensitive match against the name or, when present, the alias.
    pub fn matches(&self, name: &str) -> bool {
        self.name == name || self.alias.as_deref() == Some(name)
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableDesc {
    pub preamble: Preamble,
    pub match_fields: Vec<MatchFieldDesc>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchFieldDesc {
    pub id: u32,
    pub name: String,
    pub bitwidth: i32,
    #[serde(rename = "matchType")]
    pub match_kind: MatchKind,
}

/// The declared semantics of a match field. The kind alone decides which
/// wire encoding applies to the field's values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchKind {
    #[default]
    Unspecified,
    Valid,
    Exact,
    Lpm,
    Ternary,
    Range,
}

impl Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use MatchKind::*;
        let s = match self {
            Unspecified => "unspecified",
            Valid => "valid",
            Exact => "exact",
            Lpm => "LPM",
            Ternary => "ternary",
            Range => "range",
        };
        write!(f, "{}", s)
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionDesc {
    pub preamble: Preamble,
    pub params: Vec<ParamDesc>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParamDesc {
    pub id: u32,
    pub name: String,
    pub bitwidth: i32,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CounterDesc {
    pub preamble: Preamble,
    pub direct_table_id: u32,
}

/// What every member of every entity group can tell about itself.
///
/// Nested entities (match fields, action params) carry no alias; the
/// default covers them.
pub trait Entity {
    fn id(&self) -> u32;
    fn name(&self) -> &str;
    fn alias(&self) -> Option<&str> {
        None
    }
}

macro_rules! preamble_entity {
    ($($ty:ty),*) => {
        $(impl Entity for $ty {
            fn id(&self) -> u32 {
                self.preamble.id
            }
            fn name(&self) -> &str {
                &self.preamble.name
            }
            fn alias(&self) -> Option<&str> {
                self.preamble.alias.as_deref()
            }
        })*
    };
}

preamble_entity!(TableDesc, ActionDesc, CounterDesc);

impl Entity for MatchFieldDesc {
    fn id(&self) -> u32 {
        self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
}

impl Entity for ParamDesc {
    fn id(&self) -> u32 {
        self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
}

/// The five entity kinds the index resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Table,
    Action,
    MatchField,
    ActionParam,
    DirectCounter,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use EntityKind::*;
        let s = match self {
            Table => "table",
            Action => "action",
            MatchField => "match field",
            ActionParam => "action parameter",
            DirectCounter => "direct counter",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    /// Accepts the group names the document uses as well as the singular
    /// spellings, so a kind can be supplied dynamically.
    fn from_str(s: &str) -> Result<Self, Error> {
        use EntityKind::*;
        match s {
            "table" | "tables" => Ok(Table),
            "action" | "actions" => Ok(Action),
            "match_field" | "match_fields" => Ok(MatchField),
            "action_param" | "action_params" | "param" | "params" => Ok(ActionParam),
            "direct_counter" | "direct_counters" | "counter" => Ok(DirectCounter),
            _ => Err(Error::InvalidSelector),
        }
    }
}

/// Either half of a name/id query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selector {
    Name(String),
    Id(u32),
}

impl Selector {
    pub fn name<S: Into<String>>(name: S) -> Self {
        Selector::Name(name.into())
    }

    pub fn id(id: u32) -> Self {
        Selector::Id(id)
    }
}

impl Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Name(name) => write!(f, "\"{}\"", name.escape_debug()),
            Selector::Id(id) => write!(f, "{}", id),
        }
    }
}

/// Read-only index over one loaded [`ProgramDescription`].
///
/// Lookup policy: name queries match the entity's name or alias exactly
/// (case-sensitive); when several entities of a kind answer to the same
/// string, the first one in declaration order wins. Nested kinds (match
/// fields, action params) are walked in their parents' declaration order.
#[derive(Debug)]
pub struct ProgramIndex {
    program: ProgramDescription,
}

impl ProgramIndex {
    pub fn new(program: ProgramDescription) -> Self {
        ProgramIndex { program }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Ok(ProgramIndex::new(ProgramDescription::from_path(path)?))
    }

    pub fn program(&self) -> &ProgramDescription {
        &self.program
    }

    // One dispatch point instead of one accessor per kind: every group
    // member presents the same Entity shape.
    fn group(&self, kind: EntityKind) -> Box<dyn Iterator<Item = &dyn Entity> + '_> {
        let p = &self.program;
        match kind {
            EntityKind::Table => Box::new(p.tables.iter().map(|t| t as &dyn Entity)),
            EntityKind::Action => Box::new(p.actions.iter().map(|a| a as &dyn Entity)),
            EntityKind::DirectCounter => {
                Box::new(p.direct_counters.iter().map(|c| c as &dyn Entity))
            }
            EntityKind::MatchField => Box::new(
                p.tables
                    .iter()
                    .flat_map(|t| t.match_fields.iter())
                    .map(|f| f as &dyn Entity),
            ),
            EntityKind::ActionParam => Box::new(
                p.actions
                    .iter()
                    .flat_map(|a| a.params.iter())
                    .map(|p| p as &dyn Entity),
            ),
        }
    }

    pub fn resolve(&self, kind: EntityKind, selector: &Selector) -> Result<&dyn Entity, Error> {
        let found = match selector {
            Selector::Name(name) => self
                .group(kind)
                .find(|e| e.name() == name || e.alias() == Some(name.as_str())),
            Selector::Id(id) => self.group(kind).find(|e| e.id() == *id),
        };
        found.ok_or_else(|| Error::NotFound {
            kind,
            selector: selector.clone(),
        })
    }

    /// Dynamic entry point: exactly one of `name` and `id` must be given.
    pub fn resolve_by(
        &self,
        kind: EntityKind,
        name: Option<&str>,
        id: Option<u32>,
    ) -> Result<&dyn Entity, Error> {
        let selector = match (name, id) {
            (Some(name), None) => Selector::name(name),
            (None, Some(id)) => Selector::Id(id),
            _ => return Err(Error::InvalidSelector),
        };
        self.resolve(kind, &selector)
    }

    pub fn id_of(&self, kind: EntityKind, name: &str) -> Result<u32, Error> {
        Ok(self.resolve(kind, &Selector::name(name))?.id())
    }

    pub fn name_of(&self, kind: EntityKind, id: u32) -> Result<&str, Error> {
        Ok(self.resolve(kind, &Selector::Id(id))?.name())
    }

    pub fn alias_of(&self, kind: EntityKind, id: u32) -> Result<Option<&str>, Error> {
        Ok(self.resolve(kind, &Selector::Id(id))?.alias())
    }

    pub fn table(&self, name: &str) -> Result<&TableDesc, Error> {
        self.program
            .tables
            .iter()
            .find(|t| t.preamble.matches(name))
            .ok_or_else(|| Error::NotFound {
                kind: EntityKind::Table,
                selector: Selector::name(name),
            })
    }

    pub fn action(&self, name: &str) -> Result<&ActionDesc, Error> {
        self.program
            .actions
            .iter()
            .find(|a| a.preamble.matches(name))
            .ok_or_else(|| Error::NotFound {
                kind: EntityKind::Action,
                selector: Selector::name(name),
            })
    }

    /// Scoped lookup inside the named table. Field counts are small, so a
    /// linear scan is fine.
    pub fn match_field(&self, table_name: &str, field_name: &str) -> Result<&MatchFieldDesc, Error> {
        self.table(table_name)?
            .match_fields
            .iter()
            .find(|f| f.name == field_name)
            .ok_or_else(|| Error::NotFound {
                kind: EntityKind::MatchField,
                selector: Selector::name(field_name),
            })
    }

    pub fn action_param(&self, action_name: &str, param_name: &str) -> Result<&ParamDesc, Error> {
        self.action(action_name)?
            .params
            .iter()
            .find(|p| p.name == param_name)
            .ok_or_else(|| Error::NotFound {
                kind: EntityKind::ActionParam,
                selector: Selector::name(param_name),
            })
    }
}

impl From<&Preamble> for proto::p4info::Preamble {
    fn from(p: &Preamble) -> Self {
        proto::p4info::Preamble {
            id: p.id,
            name: p.name.clone(),
            alias: p.alias.clone().unwrap_or_default(),
        }
    }
}

impl From<MatchKind> for proto::p4info::MatchType {
    fn from(kind: MatchKind) -> Self {
        use proto::p4info::MatchType;
        match kind {
            MatchKind::Unspecified => MatchType::Unspecified,
            MatchKind::Valid => MatchType::Valid,
            MatchKind::Exact => MatchType::Exact,
            MatchKind::Lpm => MatchType::Lpm,
            MatchKind::Ternary => MatchType::Ternary,
            MatchKind::Range => MatchType::Range,
        }
    }
}

impl From<&MatchFieldDesc> for proto::p4info::MatchField {
    fn from(f: &MatchFieldDesc) -> Self {
        proto::p4info::MatchField {
            id: f.id,
            name: f.name.clone(),
            bitwidth: f.bitwidth,
            match_type: proto::p4info::MatchType::from(f.match_kind) as i32,
        }
    }
}

impl From<&TableDesc> for proto::p4info::Table {
    fn from(t: &TableDesc) -> Self {
        proto::p4info::Table {
            preamble: Some((&t.preamble).into()),
            match_fields: t.match_fields.iter().map(|f| f.into()).collect(),
        }
    }
}

impl From<&ActionDesc> for proto::p4info::Action {
    fn from(a: &ActionDesc) -> Self {
        proto::p4info::Action {
            preamble: Some((&a.preamble).into()),
            params: a
                .params
                .iter()
                .map(|p| proto::p4info::ActionParam {
                    id: p.id,
                    name: p.name.clone(),
                    bitwidth: p.bitwidth,
                })
                .collect(),
        }
    }
}

impl From<&CounterDesc> for proto::p4info::DirectCounter {
    fn from(c: &CounterDesc) -> Self {
        proto::p4info::DirectCounter {
            preamble: Some((&c.preamble).into()),
            direct_table_id: c.direct_table_id,
        }
    }
}

impl From<&ProgramDescription> for proto::p4info::P4Info {
    fn from(p: &ProgramDescription) -> Self {
        proto::p4info::P4Info {
            tables: p.tables.iter().map(|t| t.into()).collect(),
            actions: p.actions.iter().map(|a| a.into()).collect(),
            direct_counters: p.direct_counters.iter().map(|c| c.into()).collect(),
        }
    }
}

impl Display for MatchFieldDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "field {}: bit<{}> {}-match",
            self.name, self.bitwidth, self.match_kind
        )
    }
}

impl Display for TableDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "table {}:", self.preamble.name)?;
        for mf in &self.match_fields {
            write!(f, "\t{}", mf)?;
        }
        Ok(())
    }
}

impl Display for ParamDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: bit<{}>", self.name, self.bitwidth)
    }
}

impl Display for ActionDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "action {}(", self.preamble.name)?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", p)?;
        }
        write!(f, ")")
    }
}
