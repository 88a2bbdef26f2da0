use crate::projection::{FieldValue, Record, RecordSchema, TypedRecord};
use crate::table::layout::{Layout, Slot};
use crate::table::{FlattenOptions, SchemaInferenceError, TableRow, TableSchema};

type Cells = Vec<(usize, String)>;

/// Cells produced by one record: `fixed` repeats on every row, `rows` vary per row.
struct Block {
    fixed: Cells,
    rows: Vec<Cells>,
}

/// Flatten records that share one schema. An empty slice yields an empty header.
pub fn flatten(
    records: &[Record],
    opts: &FlattenOptions,
) -> Result<(TableSchema, Vec<TableRow>), SchemaInferenceError> {
    match records.first() {
        Some(first) => flatten_with_schema(first.schema(), records, opts),
        None => Ok((TableSchema::new(opts.separator.clone(), Vec::new()), Vec::new())),
    }
}

/// Flatten records against an explicit schema, so the header is known even with no records.
pub fn flatten_with_schema(
    schema: &'static RecordSchema,
    records: &[Record],
    opts: &FlattenOptions,
) -> Result<(TableSchema, Vec<TableRow>), SchemaInferenceError> {
    let layout = Layout::build(schema, &opts.separator)?;
    let width = layout.columns.len();

    let mut rows = Vec::new();
    for record in records {
        if record.schema().name != schema.name {
            return Err(SchemaInferenceError::MixedSchemas {
                expected: schema.name.to_string(),
                found: record.schema().name.to_string(),
            });
        }
        for cells in materialize(block(record, &layout.slots)) {
            let mut row = vec![String::new(); width];
            for (column, value) in cells {
                row[column] = value;
            }
            rows.push(TableRow::new(row));
        }
    }

    tracing::debug!(
        schema = schema.name,
        records = records.len(),
        rows = rows.len(),
        columns = width,
        "flattened records"
    );
    Ok((
        TableSchema::new(opts.separator.clone(), layout.column_names()),
        rows,
    ))
}

/// Flatten typed values through their declared schema.
pub fn flatten_typed<T: TypedRecord>(
    values: &[T],
    opts: &FlattenOptions,
) -> Result<(TableSchema, Vec<TableRow>), SchemaInferenceError> {
    let records: Vec<Record> = values.iter().map(TypedRecord::to_record).collect();
    flatten_with_schema(T::schema(), &records, opts)
}

fn block(record: &Record, slots: &[Slot]) -> Block {
    let mut fixed = Vec::new();
    let mut stripes: Vec<Vec<Cells>> = Vec::new();

    for (slot, value) in slots.iter().zip(record.values()) {
        match (slot, value) {
            (Slot::Scalar { column, .. }, FieldValue::Scalar(state)) => {
                fixed.push((*column, state.text().unwrap_or_default().to_string()));
            }
            (Slot::Nested { slots, .. }, FieldValue::Nested(Some(child))) => {
                let inner = block(child, slots);
                fixed.extend(inner.fixed);
                if !inner.rows.is_empty() {
                    stripes.push(inner.rows);
                }
            }
            (Slot::Repeated { slots, .. }, FieldValue::Repeated(items)) => {
                let stripe: Vec<Cells> = items
                    .iter()
                    .flat_map(|item| materialize(block(item, slots)))
                    .collect();
                if !stripe.is_empty() {
                    stripes.push(stripe);
                }
            }
            _ => {}
        }
    }

    // Sibling repeated groups share rows positionally.
    let height = stripes.iter().map(Vec::len).max().unwrap_or(0);
    let rows = (0..height)
        .map(|index| {
            stripes
                .iter()
                .filter_map(|stripe| stripe.get(index))
                .flatten()
                .cloned()
                .collect()
        })
        .collect();

    Block { fixed, rows }
}

fn materialize(block: Block) -> Vec<Cells> {
    if block.rows.is_empty() {
        return vec![block.fixed];
    }
    block
        .rows
        .into_iter()
        .map(|row| {
            let mut cells = block.fixed.clone();
            cells.extend(row);
            cells
        })
        .collect()
}
