use gloo_utils::document;
use leaflet::{LatLng, Map, MapOptions, Marker, Popup, PopupOptions, TileLayer, TileLayerOptions};
use wasm_bindgen::{closure::Closure, prelude::wasm_bindgen, JsCast, JsValue};
use web_sys::{
    js_sys::{Array, Object, Reflect},
    HtmlElement, Node,
};
use workout_tracker_lib::{
    config::TrackerConfig,
    controller::MapView,
    coordinates::Coordinates,
    presentation,
    store::Bounds,
    workout::WorkoutId,
};
use yew::{Callback, Html};

// Leaflet calls the crate does not wrap with the options we need. Maps and markers are
// cast to `LeafletObject` to reach them.
#[wasm_bindgen]
extern "C" {
    type LeafletObject;

    #[wasm_bindgen(method, js_name = on)]
    fn on(this: &LeafletObject, event: &str, handler: &Closure<dyn FnMut(ClickEvent)>);

    #[wasm_bindgen(method, js_name = setView)]
    fn set_view_with_options(this: &LeafletObject, center: &LatLng, zoom: f64, options: &JsValue);

    #[wasm_bindgen(method, js_name = fitBounds)]
    fn fit_bounds(this: &LeafletObject, bounds: &Array);

    #[wasm_bindgen(method, js_name = openPopup)]
    fn open_popup(this: &LeafletObject);

    type ClickEvent;

    #[wasm_bindgen(method, getter, js_name = latlng)]
    fn lat_lng(this: &ClickEvent) -> LatLng;
}

fn leaflet_object<T: JsCast>(value: &T) -> &LeafletObject {
    value.unchecked_ref()
}

/// The leaflet map. The container exists from the start, the map itself only once
/// a position is known.
pub struct LeafletMap {
    container: HtmlElement,
    map: Option<Map>,
    tile_url: String,
    tile_attribution: String,
    on_click: Callback<Coordinates>,
    click_handler: Option<Closure<dyn FnMut(ClickEvent)>>,
}

impl LeafletMap {
    pub fn new(config: &TrackerConfig, on_click: Callback<Coordinates>) -> Self {
        let container: HtmlElement = document()
            .create_element("div")
            .expect("document can create a div")
            .unchecked_into();
        container.set_id("map");

        Self {
            container,
            map: None,
            tile_url: config.tile_url.clone(),
            tile_attribution: config.tile_attribution.clone(),
            on_click,
            click_handler: None,
        }
    }

    pub fn render(&self) -> Html {
        let node: &Node = &self.container.clone().into();
        Html::VRef(node.clone())
    }
}

impl MapView for LeafletMap {
    fn create_map(&mut self, center: Coordinates, zoom: f64) {
        let map = Map::new_with_element(&self.container, &MapOptions::default());
        map.set_view(&lat_lng(center), zoom);
        add_tile_layer(&map, &self.tile_url, &self.tile_attribution);

        let on_click = self.on_click.clone();
        let handler = Closure::<dyn FnMut(ClickEvent)>::new(move |event: ClickEvent| {
            let position = event.lat_lng();
            on_click.emit(Coordinates::new(position.lat(), position.lng()));
        });
        leaflet_object(&map).on("click", &handler);

        // The container was sized before leaflet took it over
        map.invalidate_size(false);

        self.click_handler = Some(handler);
        self.map = Some(map);
    }

    fn add_marker(
        &mut self,
        id: &WorkoutId,
        coordinates: Coordinates,
        popup: &presentation::Popup,
    ) {
        let Some(map) = &self.map else {
            tracing::warn!("Marker for {id} before the map exists");
            return;
        };

        let opts = PopupOptions::default();
        opts.set_max_width(1000.);
        opts.set_min_width(100.);
        opts.set_auto_close(false);
        opts.set_close_on_click(false);
        opts.set_class_name(popup.class_name.clone());

        let leaflet_popup = Popup::new(&opts, None);
        leaflet_popup.set_content(&popup.content.clone().into());

        let marker = Marker::new(&lat_lng(coordinates));
        marker.bind_popup(&leaflet_popup);
        marker.add_to(map);
        leaflet_object(&marker).open_popup();
    }

    fn pan_to(&mut self, coordinates: Coordinates, zoom: f64, duration_secs: f64) {
        let Some(map) = &self.map else {
            return;
        };

        let pan = js_object(&[("duration", duration_secs.into())]);
        let options = js_object(&[("animate", true.into()), ("pan", pan.into())]);
        leaflet_object(map).set_view_with_options(&lat_lng(coordinates), zoom, &options.into());
    }

    fn fit_bounds(&mut self, bounds: Bounds) {
        let Some(map) = &self.map else {
            return;
        };

        let corner = |lat: f64, lng: f64| Array::of2(&lat.into(), &lng.into());
        let corners = Array::of2(
            &corner(bounds.min().y, bounds.min().x),
            &corner(bounds.max().y, bounds.max().x),
        );
        leaflet_object(map).fit_bounds(&corners);
    }
}

fn lat_lng(coordinates: Coordinates) -> LatLng {
    LatLng::new(coordinates.latitude(), coordinates.longitude())
}

fn add_tile_layer(map: &Map, url: &str, attribution: &str) {
    let opts = TileLayerOptions::new();
    opts.set_update_when_idle(true);
    opts.set_attribution(attribution.to_owned());
    TileLayer::new_options(url, &opts).add_to(map);
}

fn js_object(entries: &[(&str, JsValue)]) -> Object {
    let object = Object::new();
    for (key, value) in entries {
        // Setting a plain property on a fresh object cannot fail
        let _ = Reflect::set(&object, &(*key).into(), value);
    }
    object
}
