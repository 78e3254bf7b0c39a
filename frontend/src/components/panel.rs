use workout_tracker_lib::{presentation::ListEntry, workout::WorkoutId};
use yew::prelude::*;

use super::browser_view::{FormRefs, FormState};

#[derive(PartialEq, Properties, Clone)]
pub struct Props {
    pub form: FormState,
    pub refs: FormRefs,
    pub entries: Vec<ListEntry>,
    pub on_submit: Callback<()>,
    pub on_type_change: Callback<()>,
    pub on_select: Callback<WorkoutId>,
    pub on_show_all: Callback<()>,
    pub on_reset: Callback<()>,
}

/// The sidebar: the workout form on top, newest workouts right below it.
#[function_component]
pub fn Panel(props: &Props) -> Html {
    let on_show_all = props.on_show_all.reform(|_: MouseEvent| ());
    let on_reset = props.on_reset.reform(|_: MouseEvent| ());

    html! {
        <div class="sidebar">
            <ul class="workouts">
                <WorkoutForm
                    form={props.form.clone()}
                    refs={props.refs.clone()}
                    on_submit={props.on_submit.clone()}
                    on_type_change={props.on_type_change.clone()}
                />
                { for props.entries.iter().rev().map(|entry| html! {
                    <WorkoutItem entry={entry.clone()} on_select={props.on_select.clone()} />
                }) }
            </ul>
            <div class="panel-actions">
                <button class="panel-btn" onclick={on_show_all}>{"Show all"}</button>
                <button class="panel-btn panel-btn--danger" onclick={on_reset}>{"Reset"}</button>
            </div>
        </div>
    }
}

#[derive(PartialEq, Properties, Clone)]
struct FormProps {
    form: FormState,
    refs: FormRefs,
    on_submit: Callback<()>,
    on_type_change: Callback<()>,
}

#[function_component]
fn WorkoutForm(props: &FormProps) -> Html {
    let onsubmit = props.on_submit.reform(|e: SubmitEvent| {
        e.prevent_default();
    });
    let onchange = props.on_type_change.reform(|_: Event| ());

    let form = &props.form;
    let class = classes!(
        "form",
        (!form.visible).then_some("hidden"),
        form.shaking.then_some("form-shake"),
    );

    html! {
        <form {class} style={form.display_suppressed.then_some("display: none")} {onsubmit}>
            <div class="form__row">
                <label class="form__label">{"Type"}</label>
                <select class="form__input form__input--type" ref={props.refs.workout_type.clone()} {onchange}>
                    <option value="running">{"Running"}</option>
                    <option value="cycling">{"Cycling"}</option>
                </select>
            </div>
            <div class="form__row">
                <label class="form__label">{"Distance"}</label>
                <input class="form__input form__input--distance" placeholder="km" ref={props.refs.distance.clone()} />
            </div>
            <div class="form__row">
                <label class="form__label">{"Duration"}</label>
                <input class="form__input form__input--duration" placeholder="min" ref={props.refs.duration.clone()} />
            </div>
            <div class={classes!("form__row", form.show_elevation.then_some("form__row--hidden"))}>
                <label class="form__label">{"Cadence"}</label>
                <input class="form__input form__input--cadence" placeholder="step/min" ref={props.refs.cadence.clone()} />
            </div>
            <div class={classes!("form__row", (!form.show_elevation).then_some("form__row--hidden"))}>
                <label class="form__label">{"Elev Gain"}</label>
                <input class="form__input form__input--elevation" placeholder="meters" ref={props.refs.elevation.clone()} />
            </div>
            <button class="form__btn">{"OK"}</button>
        </form>
    }
}

#[derive(PartialEq, Properties, Clone)]
struct ItemProps {
    entry: ListEntry,
    on_select: Callback<WorkoutId>,
}

#[function_component]
fn WorkoutItem(props: &ItemProps) -> Html {
    let entry = &props.entry;
    let onclick = {
        let id = entry.id.clone();
        props.on_select.reform(move |_: MouseEvent| id.clone())
    };

    html! {
        <li class={entry.class_name.clone()} data-id={entry.id.to_string()} {onclick}>
            <h2 class="workout__title">{entry.title.clone()}</h2>
            { for entry.details.iter().map(|detail| html! {
                <div class="workout__details">
                    <span class="workout__icon">{detail.icon}</span>
                    <span class="workout__value">{detail.value.clone()}</span>
                    <span class="workout__unit">{detail.unit}</span>
                </div>
            }) }
        </li>
    }
}
