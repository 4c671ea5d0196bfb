use spreadsheet_ods::{CellStyleRef, Sheet, Value};

type ColumnGetter<'a, T> = Box<dyn Fn(&T) -> Option<Value> + 'a>;

struct Column<'a, T> {
    header: String,
    style: Option<CellStyleRef>,
    getter: ColumnGetter<'a, T>,
}

/// Writes rows of `T` as a table, one closure per column.
pub struct TableBuilder<'a, T> {
    columns: Vec<Column<'a, T>>,
}

impl<'a, T> TableBuilder<'a, T> {
    pub fn new() -> Self {
        Self {
            columns: Default::default(),
        }
    }

    pub fn add<G, V, N>(&mut self, header: N, getter: G) -> &mut Self
    where
        G: Fn(&T) -> V + 'a,
        V: Into<Value>,
        N: Into<String>,
    {
        self.add_optional(header, move |data: &T| Some(getter(data)))
    }

    /// Cell left empty when the getter returns `None`.
    pub fn add_optional<G, V, N>(&mut self, header: N, getter: G) -> &mut Self
    where
        G: Fn(&T) -> Option<V> + 'a,
        V: Into<Value>,
        N: Into<String>,
    {
        self.columns.push(Column {
            header: header.into(),
            style: None,
            getter: Box::new(move |data: &T| getter(data).map(|value| value.into())),
        });
        self
    }

    /// Applies `style` to the cells of the last added column.
    pub fn with_style(&mut self, style: &CellStyleRef) -> &mut Self {
        if let Some(column) = self.columns.last_mut() {
            column.style = Some(style.clone());
        }
        self
    }

    /// Writes headers at `row` then one line per input, returns the next free row.
    pub fn write<I>(&self, sheet: &mut Sheet, row: u32, col: u32, inputs: I) -> u32
    where
        I: IntoIterator<Item = T>,
    {
        for (position, column) in self.columns.iter().enumerate() {
            sheet.set_value(row, col + position as u32, column.header.as_str());
        }

        let mut row = row + 1;
        for input in inputs {
            for (position, column) in self.columns.iter().enumerate() {
                let Some(value) = (column.getter)(&input) else {
                    continue;
                };
                match column.style.as_ref() {
                    Some(style) => sheet.set_styled_value(row, col + position as u32, value, style),
                    None => sheet.set_value(row, col + position as u32, value),
                }
            }
            row += 1;
        }
        row
    }
}
