use super::*;

const POST_PAGE: &str = r#"
<html><body>
  <article class="post" data-id="5">
    <h1>Weekend ride</h1>
    <button class="like-btn active" data-post-id="5" data-type="like">👍 12</button>
    <button class="dislike-btn" data-post-id="5" data-type="dislike">👎 3</button>
  </article>
  <section class="comments">
    <div class="comment">
      <div id="comment-content-8">Nice route!</div>
      <form id="edit-form-8" style="display: none"><textarea></textarea></form>
      <button data-comment-id="8" data-type="like">Like <span class="likes-count">4</span></button>
      <button class="active" data-comment-id="8" data-type="dislike">Dislike <span class="dislikes-count">1</span></button>
    </div>
    <div class="comment">
      <div id="comment-content-9">Someone else's comment</div>
      <button data-comment-id="9" data-type="like"><span class="likes-count">0</span></button>
      <button data-comment-id="9" data-type="dislike"><span class="dislikes-count">0</span></button>
    </div>
    <button data-comment-id="abc" data-type="like">broken</button>
    <button data-post-id="5" data-type="love">broken</button>
  </section>
</body></html>
"#;

const LIST_PAGE: &str = r#"
<html><body>
  <div class="filters">
    <button class="filter-btn active" data-filter="all">All</button>
    <button class="filter-btn" data-filter="my">My posts</button>
    <button class="filter-btn" data-filter="liked">Liked</button>
  </div>
  <div class="post-preview" data-post-id="1" data-is-mine="true" data-is-liked="false"></div>
  <div class="post-preview" data-post-id="2" data-is-mine="false" data-is-liked="true"></div>
  <div class="post-preview" data-post-id="3" data-is-mine="true" data-is-liked="true"></div>
  <div class="post-preview" data-post-id="4" data-is-mine="false" data-is-liked="false"></div>
</body></html>
"#;

#[test]
fn reads_post_reaction_controls_from_button_text() {
    let page = PageModel::from_html(POST_PAGE).expect("parse");
    let controls = page
        .reaction(ReactionTarget::Post(PostId(5)))
        .expect("post controls");
    assert_eq!(controls.likes, 12);
    assert_eq!(controls.dislikes, 3);
    assert!(controls.like_active);
    assert!(!controls.dislike_active);
    assert_eq!(controls.revision, 0);
}

#[test]
fn reads_comment_counters_from_nested_spans() {
    let page = PageModel::from_html(POST_PAGE).expect("parse");
    let controls = page
        .reaction(ReactionTarget::Comment(CommentId(8)))
        .expect("comment controls");
    assert_eq!(controls.likes, 4);
    assert_eq!(controls.dislikes, 1);
    assert_eq!(controls.state().active, Some(ReactionChoice::Dislike));
}

#[test]
fn skips_controls_with_unusable_attributes() {
    let page = PageModel::from_html(POST_PAGE).expect("parse");
    let targets: Vec<_> = page.reactions().map(|controls| controls.target).collect();
    assert_eq!(
        targets,
        vec![
            ReactionTarget::Post(PostId(5)),
            ReactionTarget::Comment(CommentId(8)),
            ReactionTarget::Comment(CommentId(9)),
        ]
    );
}

#[test]
fn double_active_markup_is_normalized() {
    let html = r#"
        <button class="active" data-post-id="2" data-type="like">1</button>
        <button class="active" data-post-id="2" data-type="dislike">1</button>
    "#;
    let page = PageModel::from_html(html).expect("parse");
    let controls = page.reaction(ReactionTarget::Post(PostId(2))).expect("controls");
    assert!(controls.like_active);
    assert!(!controls.dislike_active);
}

#[test]
fn comments_start_with_content_visible() {
    let page = PageModel::from_html(POST_PAGE).expect("parse");
    let editable = page.comment(CommentId(8)).expect("comment 8");
    assert!(editable.content_visible());
    assert!(editable.has_edit_form);

    let foreign = page.comment(CommentId(9)).expect("comment 9");
    assert!(foreign.content_visible());
    assert!(!foreign.has_edit_form);
}

#[test]
fn comment_toggle_keeps_exactly_one_view_visible() {
    let mut page = PageModel::from_html(POST_PAGE).expect("parse");
    for clicks in 1..=5 {
        let view = page.toggle_comment_edit(CommentId(8)).expect("toggle");
        let editor = page.comment(CommentId(8)).expect("comment");
        assert_ne!(editor.content_visible(), editor.edit_form_visible());
        let expected = if clicks % 2 == 1 {
            CommentView::EditForm
        } else {
            CommentView::Content
        };
        assert_eq!(view, expected);
    }
}

#[test]
fn comment_without_edit_form_cannot_toggle() {
    let mut page = PageModel::from_html(POST_PAGE).expect("parse");
    assert!(page.toggle_comment_edit(CommentId(9)).is_err());
    assert!(page.toggle_comment_edit(CommentId(404)).is_err());
    assert!(page.comment(CommentId(9)).expect("comment").content_visible());
}

#[test]
fn hidden_content_with_visible_form_starts_in_edit_view() {
    let html = r#"
        <div id="comment-content-3" style="display:none">text</div>
        <form id="edit-form-3" style="display: block"></form>
    "#;
    let page = PageModel::from_html(html).expect("parse");
    assert!(page.comment(CommentId(3)).expect("comment").edit_form_visible());
}

#[test]
fn filter_shows_exactly_admitted_previews() {
    let mut page = PageModel::from_html(LIST_PAGE).expect("parse");
    assert_eq!(page.previews().len(), 4);

    for filter in PostFilter::ALL {
        let shown = page.apply_filter(filter);
        for preview in page.previews() {
            let expected = match filter {
                PostFilter::All => true,
                PostFilter::Mine => preview.is_mine,
                PostFilter::Liked => preview.is_liked,
            };
            assert_eq!(preview.shown, expected, "{filter:?} {preview:?}");
        }
        let expected_ids: Vec<_> = page
            .previews()
            .iter()
            .filter(|preview| preview.shown)
            .filter_map(|preview| preview.post_id)
            .collect();
        assert_eq!(shown, expected_ids);
    }
}

#[test]
fn filter_highlights_only_matching_button() {
    let mut page = PageModel::from_html(LIST_PAGE).expect("parse");
    assert_eq!(page.active_filter(), PostFilter::All);

    let shown = page.apply_filter(PostFilter::Mine);
    assert_eq!(shown, vec![PostId(1), PostId(3)]);
    let active: Vec<_> = page
        .filter_buttons()
        .iter()
        .filter(|button| button.active)
        .map(|button| button.filter)
        .collect();
    assert_eq!(active, vec![PostFilter::Mine]);
    assert_eq!(page.active_filter(), PostFilter::Mine);
}

#[test]
fn apply_ignores_stale_and_foreign_outcomes() {
    let target = ReactionTarget::Post(PostId(5));
    let mut controls = ReactionControls::new(target, ReactionState::default());
    let outcome = |target, revision, likes| ReactionOutcome {
        target,
        choice: ReactionChoice::Like,
        state: ReactionState {
            active: Some(ReactionChoice::Like),
            counts: ReactionCounts { likes, dislikes: 0 },
        },
        revision,
    };

    assert!(controls.apply(&outcome(target, 2, 7)));
    assert!(!controls.apply(&outcome(target, 1, 99)));
    assert!(!controls.apply(&outcome(ReactionTarget::Post(PostId(6)), 3, 42)));
    assert_eq!(controls.likes, 7);
    assert_eq!(controls.revision, 2);
    assert_eq!(controls.label(ReactionChoice::Like), "👍 7");
}

#[test]
fn page_distinguishes_superseded_from_unrendered_outcomes() {
    let target = ReactionTarget::Post(PostId(5));
    let mut page = PageModel::new();
    page.insert_reaction(target, ReactionState::default());
    let outcome = |target, revision| ReactionOutcome {
        target,
        choice: ReactionChoice::Dislike,
        state: ReactionState {
            active: Some(ReactionChoice::Dislike),
            counts: ReactionCounts {
                likes: 0,
                dislikes: 1,
            },
        },
        revision,
    };

    assert_eq!(
        page.apply_outcome(&outcome(target, 1)),
        OutcomeApplication::Applied
    );
    assert_eq!(
        page.apply_outcome(&outcome(target, 1)),
        OutcomeApplication::Superseded
    );
    assert_eq!(
        page.apply_outcome(&outcome(ReactionTarget::Comment(CommentId(5)), 1)),
        OutcomeApplication::Unrendered
    );
    assert_eq!(page.reaction(target).map(|controls| controls.dislikes), Some(1));
}

#[test]
fn oversized_counter_falls_back_to_zero() {
    let page = PageModel::from_html(
        r#"<button class="like-btn" data-post-id="3" data-type="like">👍 <span class="likes-count">99999999999999999999999</span></button>"#,
    )
    .expect("page");
    let controls = page
        .reaction(ReactionTarget::Post(PostId(3)))
        .expect("controls");
    assert_eq!(controls.likes, 0);
}

#[test]
fn dataset_resolution_reports_missing_and_bad_values() {
    let missing = ControlDataset::default();
    assert_eq!(
        missing.resolve(),
        Err(DomainError::MissingAttribute("data-post-id"))
    );

    let bad_choice = ControlDataset {
        comment_id: Some("4".into()),
        choice: Some("meh".into()),
        ..ControlDataset::default()
    };
    assert_eq!(
        bad_choice.resolve(),
        Err(DomainError::UnknownChoice("meh".into()))
    );

    let round = ControlDataset::for_target(ReactionTarget::Comment(CommentId(4)), ReactionChoice::Like);
    assert_eq!(
        round.resolve(),
        Ok((ReactionTarget::Comment(CommentId(4)), ReactionChoice::Like))
    );
}
