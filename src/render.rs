use std::io::{self, Write};

use clap::{
    ColorChoice,
    builder::styling::{AnsiColor, Style},
};

use crate::service::{EndpointLine, ServiceDescriptor};

/// Label printed in front of the cluster host.
pub const MASTER_LABEL: &str = "Kubernetes master";

const RUNNING_AT: &str = " is running at ";

/// Styles used for the two emphasized segments of every line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub label: Style,
    pub value: Style,
}

impl Palette {
    /// Green labels and yellow values.
    pub fn colored() -> Self {
        Self {
            label: AnsiColor::Green.on_default(),
            value: AnsiColor::Yellow.on_default(),
        }
    }

    /// No styling at all.
    pub fn plain() -> Self {
        Self {
            label: Style::new(),
            value: Style::new(),
        }
    }

    /// Pick a palette for `choice`.
    ///
    /// `Auto` colors only when the output is a terminal and `no_color` is false,
    /// the latter normally reflecting whether `NO_COLOR` is set.
    pub fn from_choice(choice: ColorChoice, is_terminal: bool, no_color: bool) -> Self {
        let colored = match choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => is_terminal && !no_color,
        };
        if colored {
            Self::colored()
        } else {
            Self::plain()
        }
    }
}

/// A writer with a style applied until the scope ends.
///
/// The style is reset by [`Emphasis::end`], or on drop when the scope is left
/// early, e.g. through `?` after a failed write.
struct Emphasis<'a, W: Write> {
    out: &'a mut W,
    style: Style,
    active: bool,
}

impl<'a, W: Write> Emphasis<'a, W> {
    fn begin(out: &'a mut W, style: Style) -> io::Result<Self> {
        let scope = Self {
            out,
            style,
            active: true,
        };
        write!(scope.out, "{}", style.render())?;
        Ok(scope)
    }

    fn end(mut self) -> io::Result<()> {
        self.active = false;
        write!(self.out, "{}", self.style.render_reset())
    }
}

impl<W: Write> Write for Emphasis<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.out.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

impl<W: Write> Drop for Emphasis<'_, W> {
    fn drop(&mut self) {
        if self.active {
            let _ = write!(self.out, "{}", self.style.render_reset());
        }
    }
}

fn emphasize<W: Write>(out: &mut W, style: Style, text: &str) -> io::Result<()> {
    let mut scope = Emphasis::begin(out, style)?;
    scope.write_all(text.as_bytes())?;
    scope.end()
}

fn render_line<W: Write>(out: &mut W, palette: &Palette, label: &str, value: &str) -> io::Result<()> {
    emphasize(out, palette.label, label)?;
    out.write_all(RUNNING_AT.as_bytes())?;
    emphasize(out, palette.value, value)?;
    writeln!(out)
}

/// Write `Kubernetes master is running at <host>`.
pub fn render_cluster_header<W: Write>(out: &mut W, palette: &Palette, host: &str) -> io::Result<()> {
    render_line(out, palette, MASTER_LABEL, host)
}

/// Write `<display name> is running at <url>` for one service.
pub fn render_service_line<W: Write>(
    out: &mut W,
    palette: &Palette,
    service: &ServiceDescriptor,
    cluster_host: &str,
) -> io::Result<()> {
    let EndpointLine { label, url } = EndpointLine::for_service(service, cluster_host);
    render_line(out, palette, &label, &url)
}

/// Print the cluster header followed by one line per service, in order.
///
/// Stops at the first failed write; lines already written are left as is.
pub fn run<W: Write>(
    out: &mut W,
    palette: &Palette,
    services: &[ServiceDescriptor],
    cluster_host: &str,
) -> io::Result<()> {
    render_cluster_header(out, palette, cluster_host)?;
    for service in services {
        render_service_line(out, palette, service, cluster_host)?;
    }
    out.flush()
}
