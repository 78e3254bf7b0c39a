use components::{
    browser_view::{BrowserView, ViewEvent},
    leaflet_map::LeafletMap,
    panel::Panel,
};
use storage::BrowserStorage;
use workout_tracker_lib::{
    config::TrackerConfig,
    controller::{GeolocationError, SessionController, SystemClock},
    coordinates::Coordinates,
    workout::WorkoutId,
};
use yew::prelude::*;

mod components;
mod geolocation;
mod logging;
mod storage;

type Controller = SessionController<LeafletMap, BrowserView, BrowserStorage, SystemClock>;

enum MainMsg {
    Position(Result<Coordinates, GeolocationError>),
    MapClicked(Coordinates),
    Submit,
    TypeChanged,
    SelectWorkout(WorkoutId),
    ShowAll,
    Reset,
    View(ViewEvent),
}

#[derive(PartialEq, Properties)]
struct Props {
    config: TrackerConfig,
}

struct Model {
    controller: Controller,
}

impl Component for Model {
    type Message = MainMsg;
    type Properties = Props;

    fn create(ctx: &Context<Self>) -> Self {
        let link = ctx.link();
        let config = ctx.props().config.clone();

        let map = LeafletMap::new(&config, link.callback(MainMsg::MapClicked));
        let view = BrowserView::new(&config, link.callback(MainMsg::View));
        let storage = BrowserStorage::open();
        let mut controller = SessionController::new(config, map, view, storage, SystemClock);

        controller.start();
        geolocation::request_position(link.callback(MainMsg::Position));

        Self { controller }
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            MainMsg::Position(position) => self.controller.on_position(position),
            MainMsg::MapClicked(coordinates) => self.controller.on_map_click(coordinates),
            MainMsg::Submit => {
                let form = self.controller.view().read_form();
                if let Err(err) = self.controller.on_form_submit(&form) {
                    tracing::info!("Workout not added: {err}");
                }
            }
            MainMsg::TypeChanged => self.controller.on_workout_type_change(),
            MainMsg::SelectWorkout(id) => {
                self.controller.on_workout_list_click(&id);
            }
            MainMsg::ShowAll => self.controller.on_show_all(),
            MainMsg::Reset => self.controller.reset(),
            MainMsg::View(event) => self.controller.view_mut().handle(event),
        }
        true
    }

    fn rendered(&mut self, _ctx: &Context<Self>, _first_render: bool) {
        self.controller.view_mut().focus_if_requested();
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let view = self.controller.view();

        html! {
            <>
                <Panel
                    form={view.form.clone()}
                    refs={view.refs.clone()}
                    entries={view.entries.clone()}
                    on_submit={link.callback(|()| MainMsg::Submit)}
                    on_type_change={link.callback(|()| MainMsg::TypeChanged)}
                    on_select={link.callback(MainMsg::SelectWorkout)}
                    on_show_all={link.callback(|()| MainMsg::ShowAll)}
                    on_reset={link.callback(|()| MainMsg::Reset)}
                />
                {self.controller.map().render()}
            </>
        }
    }
}

fn load_config() -> (TrackerConfig, Option<String>) {
    match TrackerConfig::from_toml(include_str!("../tracker.toml")) {
        Ok(config) => (config, None),
        Err(err) => (TrackerConfig::default(), Some(err.to_string())),
    }
}

fn main() {
    let (config, config_error) = load_config();
    logging::init(&config.log_level);
    if let Some(err) = config_error {
        tracing::warn!("Using default settings: {err}");
    }

    yew::Renderer::<Model>::with_props(Props { config }).render();
}
