use iced::font::Weight;
use iced::widget::{button, container, progress_bar, Space};
use iced::{Background, Border, Color, Element, Fill, Font, Shadow, Vector};

use crate::{ACTIVE, BORDER, MUTED, PRIMARY, SIDEBAR, SURFACE};

// -- Additional palette --

pub const ACCENT: Color = Color::from_rgb(0.133, 0.773, 0.369); // #22c55e
pub const DANGER: Color = Color::from_rgb(0.937, 0.267, 0.267); // #ef4444
pub const WARNING: Color = Color::from_rgb(0.961, 0.620, 0.043); // #f59e0b
pub const GOLD: Color = Color::from_rgb(0.984, 0.749, 0.141); // #fbbf24

// -- Fonts --

pub const BOLD: Font = Font {
    weight: Weight::Bold,
    ..Font::DEFAULT
};

fn rounded(radius: f32) -> Border {
    Border {
        radius: radius.into(),
        ..Default::default()
    }
}

fn outlined(color: Color, radius: f32) -> Border {
    Border {
        color,
        width: 1.0,
        radius: radius.into(),
    }
}

// -- Container styles --

pub fn card(_theme: &iced::Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(SURFACE)),
        border: outlined(BORDER, 16.0),
        shadow: Shadow {
            color: Color::from_rgba(0.0, 0.0, 0.0, 0.25),
            offset: Vector::new(0.0, 4.0),
            blur_radius: 12.0,
        },
        ..Default::default()
    }
}

pub fn card_flat(_theme: &iced::Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(SURFACE)),
        border: outlined(BORDER, 12.0),
        ..Default::default()
    }
}

/// Hero balance card on the compact layout.
pub fn card_hero(_theme: &iced::Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(Color::from_rgb(0.039, 0.200, 0.290))),
        border: outlined(Color::from_rgba(0.0, 0.733, 0.902, 0.4), 16.0),
        ..Default::default()
    }
}

pub fn pill(_theme: &iced::Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(ACTIVE)),
        border: rounded(20.0),
        ..Default::default()
    }
}

/// Status badge tinted with `color`.
pub fn badge(color: Color) -> impl Fn(&iced::Theme) -> container::Style {
    move |_theme| container::Style {
        background: Some(Background::Color(Color { a: 0.15, ..color })),
        text_color: Some(color),
        border: rounded(10.0),
        ..Default::default()
    }
}

pub fn bottom_bar(_theme: &iced::Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(SIDEBAR)),
        border: outlined(BORDER, 0.0),
        ..Default::default()
    }
}

pub fn progress(_theme: &iced::Theme) -> progress_bar::Style {
    progress_bar::Style {
        background: Background::Color(ACTIVE),
        bar: Background::Color(GOLD),
        border: rounded(4.0),
    }
}

// -- Button styles --

pub fn btn_primary(_theme: &iced::Theme, status: button::Status) -> button::Style {
    let base = button::Style {
        text_color: Color::WHITE,
        border: rounded(10.0),
        ..Default::default()
    };

    match status {
        button::Status::Active => button::Style {
            background: Some(Background::Color(PRIMARY)),
            shadow: Shadow {
                color: Color::from_rgba(0.0, 0.733, 0.902, 0.25),
                offset: Vector::new(0.0, 2.0),
                blur_radius: 6.0,
            },
            ..base
        },
        button::Status::Hovered => button::Style {
            background: Some(Background::Color(Color::from_rgb(0.15, 0.80, 0.95))),
            ..base
        },
        button::Status::Pressed => button::Style {
            background: Some(Background::Color(Color::from_rgb(0.0, 0.62, 0.78))),
            ..base
        },
        button::Status::Disabled => button::Style {
            background: Some(Background::Color(ACTIVE)),
            text_color: Color::from_rgba(1.0, 1.0, 1.0, 0.35),
            ..base
        },
    }
}

pub fn btn_secondary(_theme: &iced::Theme, status: button::Status) -> button::Style {
    let border = outlined(BORDER, 10.0);
    match status {
        button::Status::Active => button::Style {
            background: Some(Background::Color(Color::TRANSPARENT)),
            text_color: Color::from_rgb(0.85, 0.87, 0.92),
            border,
            ..Default::default()
        },
        button::Status::Hovered | button::Status::Pressed => button::Style {
            background: Some(Background::Color(ACTIVE)),
            text_color: Color::WHITE,
            border,
            ..Default::default()
        },
        button::Status::Disabled => button::Style {
            text_color: Color::from_rgba(1.0, 1.0, 1.0, 0.3),
            border: outlined(Color { a: 0.5, ..BORDER }, 10.0),
            ..Default::default()
        },
    }
}

pub fn btn_danger(_theme: &iced::Theme, status: button::Status) -> button::Style {
    match status {
        button::Status::Active => button::Style {
            background: Some(Background::Color(Color { a: 0.12, ..DANGER })),
            text_color: DANGER,
            border: outlined(Color { a: 0.25, ..DANGER }, 10.0),
            ..Default::default()
        },
        button::Status::Hovered | button::Status::Pressed => button::Style {
            background: Some(Background::Color(DANGER)),
            text_color: Color::WHITE,
            border: rounded(10.0),
            ..Default::default()
        },
        button::Status::Disabled => button::Style {
            background: Some(Background::Color(ACTIVE)),
            text_color: Color::from_rgba(1.0, 1.0, 1.0, 0.35),
            border: rounded(10.0),
            ..Default::default()
        },
    }
}

pub fn btn_ghost(_theme: &iced::Theme, status: button::Status) -> button::Style {
    match status {
        button::Status::Active => button::Style {
            background: None,
            text_color: Color::from_rgb(0.85, 0.87, 0.92),
            border: rounded(8.0),
            ..Default::default()
        },
        button::Status::Hovered => button::Style {
            background: Some(Background::Color(Color::from_rgba(1.0, 1.0, 1.0, 0.05))),
            text_color: Color::WHITE,
            border: rounded(8.0),
            ..Default::default()
        },
        _ => button::Style {
            text_color: MUTED,
            border: rounded(8.0),
            ..Default::default()
        },
    }
}

/// Sidebar and bottom navigation entries.
pub fn nav_btn(active: bool) -> impl Fn(&iced::Theme, button::Status) -> button::Style {
    move |_theme, status| {
        if active {
            return button::Style {
                background: Some(Background::Color(ACTIVE)),
                text_color: PRIMARY,
                border: rounded(8.0),
                ..Default::default()
            };
        }
        match status {
            button::Status::Hovered => button::Style {
                background: Some(Background::Color(Color::from_rgba(1.0, 1.0, 1.0, 0.04))),
                text_color: Color::WHITE,
                border: rounded(8.0),
                ..Default::default()
            },
            _ => button::Style {
                background: None,
                text_color: MUTED,
                border: rounded(8.0),
                ..Default::default()
            },
        }
    }
}

/// Quick-amount chips on the stake form.
pub fn toggle_btn(active: bool) -> impl Fn(&iced::Theme, button::Status) -> button::Style {
    move |_theme, status| {
        if active {
            return button::Style {
                background: Some(Background::Color(PRIMARY)),
                text_color: Color::WHITE,
                border: rounded(8.0),
                ..Default::default()
            };
        }
        let background = match status {
            button::Status::Hovered => ACTIVE,
            _ => Color::TRANSPARENT,
        };
        button::Style {
            background: Some(Background::Color(background)),
            text_color: MUTED,
            border: outlined(BORDER, 8.0),
            ..Default::default()
        }
    }
}

// -- Helpers --

pub fn separator<'a, M: 'a>() -> Element<'a, M> {
    container(Space::new())
        .width(Fill)
        .height(1)
        .style(|_theme| container::Style {
            background: Some(Background::Color(Color { a: 0.5, ..BORDER })),
            ..Default::default()
        })
        .into()
}
