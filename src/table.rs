use crate::Sink;

const INDEX_HEADER: &str = "Index";
const NAME_HEADER: &str = "Name";
const DESCRIPTION_HEADER: &str = "Description";

/// Render sinks as an aligned table, header first, one line per sink.
pub fn format_table(sinks: &[Sink]) -> String {
    // start at the header widths
    let mut index_width = INDEX_HEADER.len();
    let mut name_width = NAME_HEADER.len();
    let mut description_width = DESCRIPTION_HEADER.len();
    for sink in sinks {
        index_width = index_width.max(sink.index.to_string().len());
        name_width = name_width.max(sink.name.chars().count());
        description_width = description_width.max(sink.description.chars().count());
    }

    let mut out = format!(
        "{:>iw$}  {:<nw$}  {:<dw$}\n",
        INDEX_HEADER,
        NAME_HEADER,
        DESCRIPTION_HEADER,
        iw = index_width,
        nw = name_width,
        dw = description_width,
    );
    for sink in sinks {
        out += &format!(
            "{:>iw$}  {:<nw$}  {:<dw$}\n",
            sink.index,
            sink.name,
            sink.description,
            iw = index_width,
            nw = name_width,
            dw = description_width,
        );
    }
    out
}

/// A single unpadded sink line.
pub fn format_row(sink: &Sink) -> String {
    format!("{}  {}  {}", sink.index, sink.name, sink.description)
}
