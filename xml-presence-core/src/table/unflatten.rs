use indexmap::IndexMap;

use crate::presence::PresenceState;
use crate::projection::{FieldValue, Record, RecordSchema, TypedRecord};
use crate::table::layout::{all_columns, fixed_columns, Layout, Slot};
use crate::table::{SchemaInferenceError, TableRow, TableSchema};

/// A data row in layout column order. `None` marks a column the header does not carry.
type Cells = Vec<Option<String>>;

/// Rebuild records from a table.
///
/// Rows sharing the same non-repeated cells merge into one record, in order of first
/// appearance. An empty cell reads as [`PresenceState::PresentEmpty`] unless its field is
/// nullable, in which case it reads as absent; a column missing from the header reads as absent.
pub fn unflatten(
    table: &TableSchema,
    rows: &[TableRow],
    schema: &'static RecordSchema,
) -> Result<Vec<Record>, SchemaInferenceError> {
    let layout = Layout::build(schema, &table.separator)?;
    let mapping = resolve_header(table, &layout)?;

    let mut grid: Vec<Cells> = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        if row.cells.len() > table.width() {
            return Err(SchemaInferenceError::RowWidth {
                row: index + 1,
                expected: table.width(),
                found: row.cells.len(),
            });
        }
        if row.is_blank() {
            tracing::trace!(row = index + 1, "skipping blank row");
            continue;
        }
        let mut cells: Cells = vec![None; layout.columns.len()];
        for (header_index, column) in mapping.iter().enumerate() {
            if let Some(column) = column {
                cells[*column] = Some(row.cell(header_index).to_string());
            }
        }
        grid.push(cells);
    }

    let mut key_columns = Vec::new();
    fixed_columns(&layout.slots, &mut key_columns);

    let mut groups: IndexMap<Vec<Option<&str>>, Vec<&Cells>> = IndexMap::new();
    for cells in &grid {
        groups.entry(key(cells, &key_columns)).or_default().push(cells);
    }

    let records: Vec<Record> = groups
        .values()
        .map(|group| build_record(schema, &layout.slots, group))
        .collect();
    tracing::debug!(
        schema = schema.name,
        rows = grid.len(),
        records = records.len(),
        "unflattened table"
    );
    Ok(records)
}

/// Rebuild typed values from a table.
pub fn unflatten_typed<T: TypedRecord>(
    table: &TableSchema,
    rows: &[TableRow],
) -> Result<Vec<T>, SchemaInferenceError> {
    unflatten(table, rows, T::schema())?
        .iter()
        .map(|record| T::from_record(record).map_err(SchemaInferenceError::from))
        .collect()
}

/// Map each header cell to a layout column. Blank headers are ignored.
fn resolve_header(
    table: &TableSchema,
    layout: &Layout,
) -> Result<Vec<Option<usize>>, SchemaInferenceError> {
    let mut seen: Vec<bool> = vec![false; layout.columns.len()];
    let mut mapping = Vec::with_capacity(table.width());

    for header in &table.columns {
        if header.trim().is_empty() {
            mapping.push(None);
            continue;
        }
        let Some(column) = layout.columns.iter().position(|c| c.name == *header) else {
            return Err(SchemaInferenceError::UnknownColumn {
                column: header.clone(),
            });
        };
        if seen[column] {
            let path = layout.columns[column].path.clone();
            return Err(SchemaInferenceError::AmbiguousColumn {
                column: header.clone(),
                paths: vec![path.clone(), path],
            });
        }
        seen[column] = true;
        mapping.push(Some(column));
    }

    // A record's required columns are mandatory once the header carries any of its columns.
    let mut used_groups = vec![false; layout.groups];
    used_groups[0] = true;
    for (column, seen) in layout.columns.iter().zip(&seen) {
        if *seen {
            used_groups[column.group] = true;
        }
    }
    if let Some(column) = layout
        .columns
        .iter()
        .zip(&seen)
        .find(|(column, seen)| column.required && !**seen && used_groups[column.group])
        .map(|(column, _)| column)
    {
        return Err(SchemaInferenceError::MissingColumn {
            column: column.name.clone(),
        });
    }

    Ok(mapping)
}

fn key<'a>(cells: &'a Cells, columns: &[usize]) -> Vec<Option<&'a str>> {
    columns.iter().map(|column| cells[*column].as_deref()).collect()
}

fn has_value(cells: &Cells, column: usize) -> bool {
    cells[column].as_deref().is_some_and(|value| !value.is_empty())
}

fn cell_state(cell: Option<&str>, nullable: bool) -> PresenceState {
    match cell {
        None => PresenceState::Absent,
        Some("") if nullable => PresenceState::Absent,
        Some(text) => PresenceState::from_text(text),
    }
}

fn build_record(schema: &'static RecordSchema, slots: &[Slot], rows: &[&Cells]) -> Record {
    let spans = row_spans(slots, rows);
    let values = slots
        .iter()
        .zip(spans)
        .map(|(slot, span)| match slot {
            Slot::Scalar { column, nullable } => {
                let cell = rows.first().and_then(|cells| cells[*column].as_deref());
                FieldValue::Scalar(cell_state(cell, *nullable))
            }
            Slot::Nested {
                decl,
                schema: child,
                slots: inner,
            } => {
                let rows = &rows[..span.max(1).min(rows.len())];
                let mut columns = Vec::new();
                all_columns(inner, &mut columns);
                let has_header = rows
                    .first()
                    .is_some_and(|cells| columns.iter().any(|c| cells[*c].is_some()));
                let has_data = rows
                    .iter()
                    .any(|cells| columns.iter().any(|c| has_value(cells, *c)));
                if !has_header || (decl.nullable && !has_data) {
                    FieldValue::Nested(None)
                } else {
                    FieldValue::Nested(Some(build_record(*child, inner, rows)))
                }
            }
            Slot::Repeated {
                schema: child,
                slots: inner,
            } => FieldValue::Repeated(build_items(*child, inner, &rows[..span])),
        })
        .collect();
    Record::from_values(schema, values)
}

/// Number of leading rows of a record each slot owns.
///
/// Sibling groups share rows by position, so a group owns the rows up to its last row with
/// data. Rows past every group's data belong to the first group reaching furthest; they are
/// its present-empty items. A single-row record carries no blank items. Scalars own no rows.
fn row_spans(slots: &[Slot], rows: &[&Cells]) -> Vec<usize> {
    let extents: Vec<Option<usize>> = slots
        .iter()
        .map(|slot| {
            let columns = varying_columns(slot);
            if columns.is_empty() {
                return None;
            }
            let last = rows
                .iter()
                .rposition(|cells| columns.iter().any(|c| has_value(cells, *c)));
            Some(last.map_or(0, |index| index + 1))
        })
        .collect();

    let furthest = extents.iter().flatten().copied().max();
    let owner = match furthest {
        Some(furthest) if rows.len() > 1 => extents.iter().position(|e| *e == Some(furthest)),
        _ => None,
    };
    extents
        .iter()
        .enumerate()
        .map(|(index, extent)| match extent {
            Some(_) if owner == Some(index) => rows.len(),
            Some(extent) => *extent,
            None => 0,
        })
        .collect()
}

/// Columns of a slot that change from row to row within one record.
fn varying_columns(slot: &Slot) -> Vec<usize> {
    let mut columns = Vec::new();
    match slot {
        Slot::Scalar { .. } => {}
        Slot::Repeated { slots, .. } => all_columns(slots, &mut columns),
        Slot::Nested { slots, .. } => {
            let mut fixed = Vec::new();
            fixed_columns(slots, &mut fixed);
            all_columns(slots, &mut columns);
            columns.retain(|column| !fixed.contains(column));
        }
    }
    columns
}

/// One item per owned row. Items with their own repeated content span consecutive rows that
/// agree on the item's non-repeated cells.
fn build_items(schema: &'static RecordSchema, slots: &[Slot], rows: &[&Cells]) -> Vec<Record> {
    if !schema.has_repetition() {
        return rows
            .iter()
            .map(|cells| build_record(schema, slots, std::slice::from_ref(cells)))
            .collect();
    }

    let mut key_columns = Vec::new();
    fixed_columns(slots, &mut key_columns);

    let mut items = Vec::new();
    let mut start = 0;
    for end in 1..=rows.len() {
        let boundary =
            end == rows.len() || key(rows[end], &key_columns) != key(rows[start], &key_columns);
        if boundary {
            items.push(build_record(schema, slots, &rows[start..end]));
            start = end;
        }
    }
    items
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::unflatten;
    use crate::parser::parse_str;
    use crate::presence::PresenceState;
    use crate::projection::schema::{FieldDecl, RecordSchema};
    use crate::projection::{project_record, reflect_record};
    use crate::table::{flatten, FlattenOptions, SchemaInferenceError, TableRow, TableSchema};

    static ACTION: RecordSchema = RecordSchema::new(
        "action",
        &[
            FieldDecl::attribute("name").required(),
            FieldDecl::attribute("type").nullable(),
        ],
    );
    static ACTIONS: RecordSchema = RecordSchema::new("action_types", &[FieldDecl::repeated(&ACTION)]);

    static MODIFIER: RecordSchema = RecordSchema::new("Modifier", &[FieldDecl::attribute("code")]);
    static MODIFIERS: RecordSchema =
        RecordSchema::new("Modifiers", &[FieldDecl::repeated(&MODIFIER)]);
    static SKILL: RecordSchema = RecordSchema::new(
        "Skill",
        &[
            FieldDecl::attribute("id").required(),
            FieldDecl::nested(&MODIFIERS).nullable(),
        ],
    );
    static SKILLS: RecordSchema = RecordSchema::new("Skills", &[FieldDecl::repeated(&SKILL)]);

    fn table(columns: &[&str]) -> TableSchema {
        TableSchema::new("_", columns.iter().map(ToString::to_string).collect())
    }

    fn row(cells: &[&str]) -> TableRow {
        cells.iter().copied().collect()
    }

    #[test]
    fn rows_merge_into_one_record_with_ordered_items() {
        let rows = vec![row(&["a", "x"]), row(&["b", ""]), row(&["c", "z"])];
        let records =
            unflatten(&table(&["action_name", "action_type"]), &rows, &ACTIONS).expect("unflatten");

        assert_eq!(records.len(), 1);
        let actions = records[0].repeated("action");
        let names: Vec<_> = actions.iter().map(|a| a.scalar("name")).collect();
        assert_eq!(
            names,
            vec![
                PresenceState::from_text("a"),
                PresenceState::from_text("b"),
                PresenceState::from_text("c")
            ]
        );
        assert_eq!(actions[1].scalar("type"), PresenceState::Absent);
    }

    #[test]
    fn nested_repetition_splits_on_owner_cells() {
        let xml = r#"<Skills><Skill id="a"><Modifiers><Modifier code="1"/><Modifier code="2"/></Modifiers></Skill><Skill id="b"/></Skills>"#;
        let node = parse_str(xml).expect("parse");
        let record = project_record(&node, &SKILLS).expect("project");

        let (schema, rows) = flatten(&[record], &FlattenOptions::default()).expect("flatten");
        assert_eq!(rows.len(), 3);

        let records = unflatten(&schema, &rows, &SKILLS).expect("unflatten");
        assert_eq!(records.len(), 1);
        assert_eq!(reflect_record(&records[0]), node);
    }

    #[test]
    fn unknown_header_is_rejected() {
        let err = unflatten(&table(&["action_name", "bogus"]), &[], &ACTIONS).expect_err("fail");
        assert_eq!(
            err,
            SchemaInferenceError::UnknownColumn {
                column: "bogus".to_string()
            }
        );
    }

    #[test]
    fn duplicate_header_is_ambiguous() {
        let err = unflatten(&table(&["action_name", "action_name"]), &[], &ACTIONS)
            .expect_err("fail");
        assert!(matches!(err, SchemaInferenceError::AmbiguousColumn { .. }));
    }

    #[test]
    fn required_column_must_be_present() {
        let err = unflatten(&table(&["action_type"]), &[], &ACTIONS).expect_err("fail");
        assert_eq!(
            err,
            SchemaInferenceError::MissingColumn {
                column: "action_name".to_string()
            }
        );
    }

    #[test]
    fn overlong_row_reports_width() {
        let err = unflatten(&table(&["action_name"]), &[row(&["a", "b"])], &ACTIONS)
            .expect_err("fail");
        assert_eq!(
            err,
            SchemaInferenceError::RowWidth {
                row: 1,
                expected: 1,
                found: 2
            }
        );
    }

    #[test]
    fn missing_optional_column_reads_absent() {
        let records =
            unflatten(&table(&["action_name"]), &[row(&["a"])], &ACTIONS).expect("unflatten");
        assert_eq!(records[0].repeated("action")[0].scalar("type"), PresenceState::Absent);
    }
}
