// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A plotters backend that writes PostScript, EPS or PDF.
//!
//! Drawing operations are recorded as they arrive and written out as vector
//! primitives when the backend is presented. Text is set in Helvetica; its
//! extent is estimated rather than measured, so no font files are needed.

use std::{
    fmt::Write as _,
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use plotters_backend::{
    text_anchor::{HPos, VPos},
    BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingBackend,
    DrawingErrorKind, FontTransform,
};

/// The average width of a Helvetica glyph relative to the font size.
const GLYPH_WIDTH: f64 = 0.55;

/// Bézier control-point distance for approximating a quarter circle.
const KAPPA: f64 = 0.552_284_75;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VectorFormat {
    Ps,
    Eps,
    Pdf,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Rgb(f64, f64, f64);

impl Rgb {
    /// Blend against a white page.
    fn from_backend(colour: BackendColor) -> Rgb {
        let blend = |c: u8| 1.0 - colour.alpha * (1.0 - f64::from(c) / 255.0);
        Rgb(
            blend(colour.rgb.0),
            blend(colour.rgb.1),
            blend(colour.rgb.2),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Op {
    Path {
        points: Vec<(f64, f64)>,
        colour: Rgb,
        width: f64,
        closed: bool,
        fill: bool,
    },
    Circle {
        centre: (f64, f64),
        radius: f64,
        colour: Rgb,
        width: f64,
        fill: bool,
    },
    Text {
        origin: (f64, f64),
        /// Counter-clockwise [degrees]
        angle: f64,
        size: f64,
        colour: Rgb,
        text: String,
    },
}

pub(crate) struct VectorBackend {
    path: PathBuf,
    size: (u32, u32),
    format: VectorFormat,
    ops: Vec<Op>,
}

impl VectorBackend {
    pub(crate) fn new<P: AsRef<Path>>(path: P, size: (u32, u32), format: VectorFormat) -> Self {
        VectorBackend {
            path: path.as_ref().to_path_buf(),
            size,
            format,
            ops: vec![],
        }
    }

    /// Flip backend coordinates (origin at the top left) into page
    /// coordinates (origin at the bottom left).
    fn page(&self, (x, y): BackendCoord) -> (f64, f64) {
        (f64::from(x), f64::from(self.size.1) - f64::from(y))
    }

    fn push(&mut self, op: Op) {
        self.ops.push(op);
    }

    fn render(&self) -> Vec<u8> {
        match self.format {
            VectorFormat::Pdf => render_pdf(&self.ops, self.size),
            VectorFormat::Eps => render_postscript(&self.ops, self.size, true).into_bytes(),
            VectorFormat::Ps => render_postscript(&self.ops, self.size, false).into_bytes(),
        }
    }
}

impl DrawingBackend for VectorBackend {
    type ErrorType = std::io::Error;

    fn get_size(&self) -> (u32, u32) {
        self.size
    }

    fn ensure_prepared(&mut self) -> Result<(), DrawingErrorKind<std::io::Error>> {
        Ok(())
    }

    fn present(&mut self) -> Result<(), DrawingErrorKind<std::io::Error>> {
        let write = || -> std::io::Result<()> {
            let mut f = BufWriter::new(File::create(&self.path)?);
            f.write_all(&self.render())?;
            f.flush()
        };
        write().map_err(DrawingErrorKind::DrawingError)
    }

    fn draw_pixel(
        &mut self,
        point: BackendCoord,
        colour: BackendColor,
    ) -> Result<(), DrawingErrorKind<std::io::Error>> {
        if colour.alpha == 0.0 {
            return Ok(());
        }
        let (x, y) = self.page(point);
        self.push(Op::Path {
            points: vec![(x, y), (x + 1.0, y), (x + 1.0, y - 1.0), (x, y - 1.0)],
            colour: Rgb::from_backend(colour),
            width: 0.0,
            closed: true,
            fill: true,
        });
        Ok(())
    }

    fn draw_line<S: BackendStyle>(
        &mut self,
        from: BackendCoord,
        to: BackendCoord,
        style: &S,
    ) -> Result<(), DrawingErrorKind<std::io::Error>> {
        self.draw_path([from, to], style)
    }

    fn draw_rect<S: BackendStyle>(
        &mut self,
        upper_left: BackendCoord,
        bottom_right: BackendCoord,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<std::io::Error>> {
        if style.color().alpha == 0.0 {
            return Ok(());
        }
        let (x0, y0) = self.page(upper_left);
        let (x1, y1) = self.page(bottom_right);
        self.push(Op::Path {
            points: vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1)],
            colour: Rgb::from_backend(style.color()),
            width: f64::from(style.stroke_width()),
            closed: true,
            fill,
        });
        Ok(())
    }

    fn draw_path<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        path: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<std::io::Error>> {
        if style.color().alpha == 0.0 {
            return Ok(());
        }
        let points: Vec<_> = path.into_iter().map(|p| self.page(p)).collect();
        if points.len() < 2 {
            return Ok(());
        }
        self.push(Op::Path {
            points,
            colour: Rgb::from_backend(style.color()),
            width: f64::from(style.stroke_width()),
            closed: false,
            fill: false,
        });
        Ok(())
    }

    fn draw_circle<S: BackendStyle>(
        &mut self,
        centre: BackendCoord,
        radius: u32,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<std::io::Error>> {
        if style.color().alpha == 0.0 {
            return Ok(());
        }
        let centre = self.page(centre);
        self.push(Op::Circle {
            centre,
            radius: f64::from(radius),
            colour: Rgb::from_backend(style.color()),
            width: f64::from(style.stroke_width()),
            fill,
        });
        Ok(())
    }

    fn fill_polygon<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        vert: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<std::io::Error>> {
        if style.color().alpha == 0.0 {
            return Ok(());
        }
        let points: Vec<_> = vert.into_iter().map(|p| self.page(p)).collect();
        if points.len() < 3 {
            return Ok(());
        }
        self.push(Op::Path {
            points,
            colour: Rgb::from_backend(style.color()),
            width: 0.0,
            closed: true,
            fill: true,
        });
        Ok(())
    }

    fn draw_text<TStyle: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &TStyle,
        pos: BackendCoord,
    ) -> Result<(), DrawingErrorKind<std::io::Error>> {
        let size = style.size();
        let width = estimate_width(text, size);
        let angle: f64 = match style.transform() {
            FontTransform::None => 0.0,
            FontTransform::Rotate90 => -90.0,
            FontTransform::Rotate180 => 180.0,
            FontTransform::Rotate270 => 90.0,
        };

        // Offset of the baseline start from the anchor, in the text's own
        // (unrotated) frame.
        let anchor = style.anchor();
        let dx = match anchor.h_pos {
            HPos::Left => 0.0,
            HPos::Center => -width / 2.0,
            HPos::Right => -width,
        };
        let dy = match anchor.v_pos {
            VPos::Top => -0.8 * size,
            VPos::Center => -0.35 * size,
            VPos::Bottom => 0.0,
        };
        let (sin, cos) = angle.to_radians().sin_cos();
        let (x, y) = self.page(pos);
        self.push(Op::Text {
            origin: (x + dx * cos - dy * sin, y + dx * sin + dy * cos),
            angle,
            size,
            colour: Rgb::from_backend(style.color()),
            text: text.to_string(),
        });
        Ok(())
    }

    fn estimate_text_size<TStyle: BackendTextStyle>(
        &self,
        text: &str,
        style: &TStyle,
    ) -> Result<(u32, u32), DrawingErrorKind<std::io::Error>> {
        let size = style.size();
        Ok((
            estimate_width(text, size).ceil() as u32,
            size.ceil() as u32,
        ))
    }
}

fn estimate_width(text: &str, size: f64) -> f64 {
    GLYPH_WIDTH * size * text.chars().count() as f64
}

/// Escape text for a PostScript or PDF string literal. Only ASCII is
/// available in the standard Helvetica encoding.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            'λ' => out.push_str("lambda"),
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

/// Points along a circle as four Bézier segments: the start point, then
/// (control 1, control 2, end) for each quarter.
fn circle_segments((cx, cy): (f64, f64), r: f64) -> ((f64, f64), [[(f64, f64); 3]; 4]) {
    let k = KAPPA * r;
    (
        (cx + r, cy),
        [
            [(cx + r, cy + k), (cx + k, cy + r), (cx, cy + r)],
            [(cx - k, cy + r), (cx - r, cy + k), (cx - r, cy)],
            [(cx - r, cy - k), (cx - k, cy - r), (cx, cy - r)],
            [(cx + k, cy - r), (cx + r, cy - k), (cx + r, cy)],
        ],
    )
}

fn render_postscript(ops: &[Op], (width, height): (u32, u32), eps: bool) -> String {
    let mut s = String::new();
    // Writing into a String can't fail.
    let _ = render_postscript_inner(&mut s, ops, width, height, eps);
    s
}

fn render_postscript_inner(
    s: &mut String,
    ops: &[Op],
    width: u32,
    height: u32,
    eps: bool,
) -> std::fmt::Result {
    if eps {
        writeln!(s, "%!PS-Adobe-3.0 EPSF-3.0")?;
    } else {
        writeln!(s, "%!PS-Adobe-3.0")?;
        writeln!(s, "%%Pages: 1")?;
    }
    writeln!(s, "%%BoundingBox: 0 0 {width} {height}")?;
    writeln!(s, "%%Creator: lofar-steps")?;
    writeln!(s, "%%EndComments")?;
    if !eps {
        writeln!(s, "%%Page: 1 1")?;
        writeln!(s, "<< /PageSize [{width} {height}] >> setpagedevice")?;
    }
    writeln!(s, "1 setlinejoin 1 setlinecap")?;

    for op in ops {
        match op {
            Op::Path {
                points,
                colour,
                width,
                closed,
                fill,
            } => {
                writeln!(s, "{:.3} {:.3} {:.3} setrgbcolor", colour.0, colour.1, colour.2)?;
                writeln!(s, "{width:.2} setlinewidth")?;
                write!(s, "newpath {:.2} {:.2} moveto", points[0].0, points[0].1)?;
                for (x, y) in &points[1..] {
                    write!(s, " {x:.2} {y:.2} lineto")?;
                }
                if *closed {
                    write!(s, " closepath")?;
                }
                writeln!(s, " {}", if *fill { "fill" } else { "stroke" })?;
            }

            Op::Circle {
                centre,
                radius,
                colour,
                width,
                fill,
            } => {
                writeln!(s, "{:.3} {:.3} {:.3} setrgbcolor", colour.0, colour.1, colour.2)?;
                writeln!(s, "{width:.2} setlinewidth")?;
                writeln!(
                    s,
                    "newpath {:.2} {:.2} {radius:.2} 0 360 arc closepath {}",
                    centre.0,
                    centre.1,
                    if *fill { "fill" } else { "stroke" }
                )?;
            }

            Op::Text {
                origin,
                angle,
                size,
                colour,
                text,
            } => {
                writeln!(s, "{:.3} {:.3} {:.3} setrgbcolor", colour.0, colour.1, colour.2)?;
                writeln!(s, "/Helvetica findfont {size:.2} scalefont setfont")?;
                writeln!(
                    s,
                    "gsave {:.2} {:.2} translate {angle:.1} rotate 0 0 moveto ({}) show grestore",
                    origin.0,
                    origin.1,
                    escape_text(text)
                )?;
            }
        }
    }

    writeln!(s, "showpage")?;
    writeln!(s, "%%EOF")?;
    Ok(())
}

fn pdf_content(ops: &[Op]) -> String {
    let mut s = String::new();
    let _ = pdf_content_inner(&mut s, ops);
    s
}

fn pdf_content_inner(s: &mut String, ops: &[Op]) -> std::fmt::Result {
    writeln!(s, "1 j 1 J")?;
    for op in ops {
        match op {
            Op::Path {
                points,
                colour,
                width,
                closed,
                fill,
            } => {
                let Rgb(r, g, b) = colour;
                writeln!(s, "{r:.3} {g:.3} {b:.3} RG {r:.3} {g:.3} {b:.3} rg {width:.2} w")?;
                write!(s, "{:.2} {:.2} m", points[0].0, points[0].1)?;
                for (x, y) in &points[1..] {
                    write!(s, " {x:.2} {y:.2} l")?;
                }
                if *closed {
                    write!(s, " h")?;
                }
                writeln!(s, " {}", if *fill { "f" } else { "S" })?;
            }

            Op::Circle {
                centre,
                radius,
                colour,
                width,
                fill,
            } => {
                let Rgb(r, g, b) = colour;
                writeln!(s, "{r:.3} {g:.3} {b:.3} RG {r:.3} {g:.3} {b:.3} rg {width:.2} w")?;
                let (start, segments) = circle_segments(*centre, *radius);
                write!(s, "{:.2} {:.2} m", start.0, start.1)?;
                for [c1, c2, end] in segments {
                    write!(
                        s,
                        " {:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c",
                        c1.0, c1.1, c2.0, c2.1, end.0, end.1
                    )?;
                }
                writeln!(s, " h {}", if *fill { "f" } else { "S" })?;
            }

            Op::Text {
                origin,
                angle,
                size,
                colour,
                text,
            } => {
                let Rgb(r, g, b) = colour;
                let (sin, cos) = angle.to_radians().sin_cos();
                writeln!(
                    s,
                    "{r:.3} {g:.3} {b:.3} rg BT /F1 {size:.2} Tf {cos:.4} {sin:.4} {:.4} {cos:.4} {:.2} {:.2} Tm ({}) Tj ET",
                    -sin,
                    origin.0,
                    origin.1,
                    escape_text(text)
                )?;
            }
        }
    }
    Ok(())
}

fn render_pdf(ops: &[Op], (width, height): (u32, u32)) -> Vec<u8> {
    let content = pdf_content(ops);
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {width} {height}] \
             /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>"
        ),
        format!(
            "<< /Length {} >>\nstream\n{content}endstream",
            content.len()
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, object) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.push_str(&format!("{} 0 obj\n{object}\nendobj\n", i + 1));
    }
    let xref_offset = out.len();
    out.push_str(&format!("xref\n0 {}\n", objects.len() + 1));
    out.push_str("0000000000 65535 f \n");
    for offset in offsets {
        out.push_str(&format!("{offset:010} 00000 n \n"));
    }
    out.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
        objects.len() + 1
    ));
    out.into_bytes()
}
