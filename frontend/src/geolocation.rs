use gloo_utils::window;
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{Position, PositionError};
use workout_tracker_lib::{controller::GeolocationError, coordinates::Coordinates};
use yew::Callback;

/// Asks the browser for the current position once. The answer, or the reason there
/// is none, arrives through `done`.
pub fn request_position(done: Callback<Result<Coordinates, GeolocationError>>) {
    let Ok(geolocation) = window().navigator().geolocation() else {
        done.emit(Err(GeolocationError::Unsupported));
        return;
    };

    let on_success = {
        let done = done.clone();
        Closure::once_into_js(move |position: Position| {
            let coords = position.coords();
            done.emit(Ok(Coordinates::new(coords.latitude(), coords.longitude())));
        })
    };

    let on_error = {
        let done = done.clone();
        Closure::once_into_js(move |error: PositionError| {
            done.emit(Err(GeolocationError::from_code(error.code())));
        })
    };

    let requested = geolocation.get_current_position_with_error_callback(
        on_success.unchecked_ref(),
        Some(on_error.unchecked_ref()),
    );
    if let Err(err) = requested {
        tracing::error!("Position request failed: {err:?}");
        done.emit(Err(GeolocationError::Unsupported));
    }
}
