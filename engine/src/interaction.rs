/// A cursor position in screen pixels, used to anchor the hover tooltip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

/// Pointer interaction state. Hover is ephemeral and follows the cursor;
/// selection persists until the dataset changes or empty space is clicked.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InteractionState {
    pub hovered: Option<usize>,
    pub hover_point: Option<ScreenPoint>,
    pub selected: Option<usize>,
}

/// A pointer event resolved against the dataset. `feature` is the index of
/// the district under the cursor, if any.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Move {
        point: ScreenPoint,
        feature: Option<usize>,
    },
    Leave,
    Click {
        feature: Option<usize>,
    },
    DatasetChanged,
}

/// Side effects a transition asks the caller to perform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionOutput {
    SetHoverFilter(Option<usize>),
    SetSelectedDistrict(Option<usize>),
    NotifyHover {
        feature: Option<usize>,
        point: Option<ScreenPoint>,
    },
    NotifySelect(Option<usize>),
}

/// Compute the next interaction state and the outputs it requires. Pure, so
/// every hover/select path is testable without a surface or host.
pub fn transition(
    state: &InteractionState,
    event: PointerEvent,
) -> (InteractionState, Vec<InteractionOutput>) {
    let mut next = *state;
    let mut outputs = Vec::new();

    match event {
        PointerEvent::Move {
            point,
            feature: Some(idx),
        } => {
            next.hovered = Some(idx);
            next.hover_point = Some(point);
            // Emitted on every move so the tooltip tracks the cursor
            outputs.push(InteractionOutput::SetHoverFilter(Some(idx)));
            outputs.push(InteractionOutput::NotifyHover {
                feature: Some(idx),
                point: Some(point),
            });
        }
        PointerEvent::Move { feature: None, .. } | PointerEvent::Leave => {
            if state.hovered.is_some() || state.hover_point.is_some() {
                next.hovered = None;
                next.hover_point = None;
                outputs.push(InteractionOutput::SetHoverFilter(None));
                outputs.push(InteractionOutput::NotifyHover {
                    feature: None,
                    point: None,
                });
            }
        }
        PointerEvent::Click { feature: Some(idx) } => {
            next.selected = Some(idx);
            outputs.push(InteractionOutput::SetSelectedDistrict(Some(idx)));
            outputs.push(InteractionOutput::NotifySelect(Some(idx)));
        }
        PointerEvent::Click { feature: None } => {
            if state.selected.is_some() {
                next.selected = None;
                outputs.push(InteractionOutput::SetSelectedDistrict(None));
                outputs.push(InteractionOutput::NotifySelect(None));
            }
        }
        PointerEvent::DatasetChanged => {
            next = InteractionState::default();
            // The surface always resets for the new dataset; the host only
            // hears about hover/selection it actually had.
            outputs.push(InteractionOutput::SetHoverFilter(None));
            outputs.push(InteractionOutput::SetSelectedDistrict(None));
            if state.hovered.is_some() || state.hover_point.is_some() {
                outputs.push(InteractionOutput::NotifyHover {
                    feature: None,
                    point: None,
                });
            }
            if state.selected.is_some() {
                outputs.push(InteractionOutput::NotifySelect(None));
            }
        }
    }

    (next, outputs)
}
