use crate::{Conjunction, DbSetting, FilterValue, Operation, Parameter, QueryField, Value, separated_by};
use std::collections::{HashMap, HashSet};

/// Node of the predicate tree.
#[derive(Debug, Clone, PartialEq, Hash)]
pub enum QueryNode {
    Field(QueryField),
    Group(QueryGroup),
}

impl From<QueryField> for QueryNode {
    fn from(value: QueryField) -> Self {
        QueryNode::Field(value)
    }
}

impl From<QueryGroup> for QueryNode {
    fn from(value: QueryGroup) -> Self {
        QueryNode::Group(value)
    }
}

/// Internal node of the predicate tree, its children are joined by the conjunction.
#[derive(Default, Debug, Clone, PartialEq, Hash)]
pub struct QueryGroup {
    pub conjunction: Conjunction,
    pub children: Vec<QueryNode>,
    pub is_not: bool,
}

/// Assigns the parameter names while walking the tree in rendering order.
///
/// The first use of a name is `Name`, the following ones `Name_1`, `Name_2`
/// and so on. A candidate is skipped when any name it would emit was already
/// emitted, or is the base name of another field of the tree. The prefix and
/// the batch row suffix are applied on top.
struct ParameterNamer<'a> {
    setting: &'a DbSetting,
    prefix: &'a str,
    index: Option<usize>,
    counters: HashMap<String, usize>,
    reserved: HashSet<String>,
    taken: HashSet<String>,
}

impl<'a> ParameterNamer<'a> {
    fn new(setting: &'a DbSetting, prefix: &'a str, index: Option<usize>, group: &QueryGroup) -> Self {
        let reserved = group
            .fields()
            .into_iter()
            .map(|f| setting.parameter_name(&f.field.name).to_ascii_lowercase())
            .collect();
        Self {
            setting,
            prefix,
            index,
            counters: HashMap::new(),
            reserved,
            taken: HashSet::new(),
        }
    }

    fn next(&mut self, field: &QueryField) -> String {
        let base = self.setting.parameter_name(&field.field.name);
        let key = base.to_ascii_lowercase();
        let suffixes = parameter_suffixes(field);
        let count = self.counters.entry(key.clone()).or_insert(0);
        loop {
            let name = if *count == 0 {
                base.clone()
            } else {
                format!("{}_{}", base, count)
            };
            *count += 1;
            let emitted = suffixes
                .iter()
                .map(|s| format!("{name}{s}").to_ascii_lowercase())
                .collect::<Vec<_>>();
            let free = emitted.iter().all(|n| {
                !self.taken.contains(n) && (*n == key || !self.reserved.contains(n))
            });
            if free {
                self.taken.extend(emitted);
                return format!("{}{}", self.prefix, name);
            }
        }
    }

    fn finish(&self, name: &str) -> String {
        match self.index {
            Some(i) => format!("{name}_{i}"),
            None => name.to_string(),
        }
    }
}

impl QueryGroup {
    pub fn new(conjunction: Conjunction) -> Self {
        Self {
            conjunction,
            children: Vec::new(),
            is_not: false,
        }
    }

    pub fn and<N: Into<QueryNode>>(children: impl IntoIterator<Item = N>) -> Self {
        Self {
            conjunction: Conjunction::And,
            children: children.into_iter().map(Into::into).collect(),
            is_not: false,
        }
    }

    pub fn or<N: Into<QueryNode>>(children: impl IntoIterator<Item = N>) -> Self {
        Self {
            conjunction: Conjunction::Or,
            children: children.into_iter().map(Into::into).collect(),
            is_not: false,
        }
    }

    pub fn push(&mut self, node: impl Into<QueryNode>) -> &mut Self {
        self.children.push(node.into());
        self
    }

    pub fn not(mut self) -> Self {
        self.is_not = !self.is_not;
        self
    }

    /// True when no leaf is reachable from this group.
    pub fn is_empty(&self) -> bool {
        self.children.iter().all(|c| match c {
            QueryNode::Field(..) => false,
            QueryNode::Group(g) => g.is_empty(),
        })
    }

    /// Every leaf, depth first.
    pub fn fields(&self) -> Vec<&QueryField> {
        let mut result = Vec::new();
        fn collect<'a>(group: &'a QueryGroup, out: &mut Vec<&'a QueryField>) {
            for child in &group.children {
                match child {
                    QueryNode::Field(f) => out.push(f),
                    QueryNode::Group(g) => collect(g, out),
                }
            }
        }
        collect(self, &mut result);
        result
    }

    /// Renders the tree into a parenthesized predicate and the parameters it references.
    ///
    /// `prefix` is prepended to every parameter name, `index` appends the
    /// batch row suffix.
    pub fn render(
        &self,
        setting: &DbSetting,
        prefix: &str,
        index: Option<usize>,
    ) -> (String, Vec<Parameter>) {
        let mut out = String::with_capacity(64);
        let mut parameters = Vec::new();
        let mut namer = ParameterNamer::new(setting, prefix, index, self);
        self.write_group(&mut out, &mut parameters, &mut namer);
        (out, parameters)
    }

    /// The predicate text with the default parameter names.
    pub fn get_string(&self, setting: &DbSetting) -> String {
        self.render(setting, "", None).0
    }

    pub fn parameters(
        &self,
        setting: &DbSetting,
        prefix: &str,
        index: Option<usize>,
    ) -> Vec<Parameter> {
        self.render(setting, prefix, index).1
    }

    fn write_group(&self, out: &mut String, parameters: &mut Vec<Parameter>, namer: &mut ParameterNamer) {
        if self.is_empty() {
            return;
        }
        if self.is_not {
            out.push_str("NOT ");
        }
        out.push('(');
        let separator = format!(" {} ", self.conjunction.text());
        separated_by(
            out,
            self.children.iter(),
            |out, child| match child {
                QueryNode::Field(f) => write_field(f, out, parameters, namer),
                QueryNode::Group(g) => g.write_group(out, parameters, namer),
            },
            &separator,
        );
        out.push(')');
    }
}

/// Suffixes of the parameters bound by `field`, a single empty one when it
/// binds one value or none.
fn parameter_suffixes(field: &QueryField) -> Vec<String> {
    match &field.value {
        FilterValue::List(values) if !values.is_empty() => {
            (0..values.len()).map(|i| format!("_In_{i}")).collect()
        }
        FilterValue::Range(..) => vec!["_Left".into(), "_Right".into()],
        _ => vec![String::new()],
    }
}

fn write_field(
    field: &QueryField,
    out: &mut String,
    parameters: &mut Vec<Parameter>,
    namer: &mut ParameterNamer,
) {
    let setting = namer.setting;
    let column = setting.quote(&field.field.name);
    let column = match field.function {
        Some(function) => function.render(&column),
        None => column,
    };
    let name = namer.next(field);
    let mut bind = |suffix: &str, value: &Value| {
        let name = namer.finish(&format!("{name}{suffix}"));
        let text = format!("{}{}", setting.parameter_prefix, name);
        parameters.push(Parameter::new(name, value.clone()));
        text
    };
    match (&field.operation, &field.value) {
        (Operation::Equal, FilterValue::Single(v)) if v.is_null() => {
            out.push_str(&format!("{column} IS NULL"));
        }
        (Operation::NotEqual, FilterValue::Single(v)) if v.is_null() => {
            out.push_str(&format!("{column} IS NOT NULL"));
        }
        (Operation::In, FilterValue::List(values)) if values.is_empty() => {
            out.push_str("1 = 0");
        }
        (Operation::NotIn, FilterValue::List(values)) if values.is_empty() => {
            out.push_str("1 = 1");
        }
        (operation, FilterValue::List(values)) => {
            let items = values
                .iter()
                .enumerate()
                .map(|(i, v)| bind(&format!("_In_{i}"), v))
                .collect::<Vec<_>>()
                .join(", ");
            out.push_str(&format!("{column} {operation} ({items})"));
        }
        (operation, FilterValue::Range(left, right)) => {
            let left = bind("_Left", left);
            let right = bind("_Right", right);
            out.push_str(&format!("{column} {operation} {left} AND {right}"));
        }
        (operation, FilterValue::Single(v)) => {
            let parameter = bind("", v);
            out.push_str(&format!("{column} {operation} {parameter}"));
        }
    }
}
