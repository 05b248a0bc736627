pub(crate) mod glyph_widths;
